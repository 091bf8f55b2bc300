//! # booking-engine
//!
//! Availability and double-booking protection for a single shared appointment
//! schedule, where every service takes one fixed-width slot.
//!
//! The core is two pure functions over a snapshot of bookings:
//! [`generate_slots`] lists the bookable start times for a date, and
//! [`try_reserve`] re-checks a proposed start immediately before a write. Both
//! use the same half-open interval overlap rule from [`overlap`].
//!
//! ```rust
//! use booking_engine::{generate_slots, parse_date, ScheduleRules};
//!
//! let rules = ScheduleRules::default(); // 09:00-17:00, 30-minute slots
//! let date = parse_date("2024-06-10").unwrap();
//! let now = parse_date("2024-06-10").unwrap().and_hms_opt(10, 7, 0).unwrap();
//!
//! let slots = generate_slots(&rules, date, &[], now);
//! assert_eq!(slots.first().unwrap().to_string(), "10:30:00");
//! assert_eq!(slots.last().unwrap().to_string(), "16:30:00");
//! ```
//!
//! ## Modules
//!
//! - [`rules`] — business hours and slot width
//! - [`model`] — booking records, ids, services, date/time parsing
//! - [`overlap`] — the shared overlap predicate and double-booking audit
//! - [`slots`] — SlotGenerator
//! - [`guard`] — BookingGuard
//! - [`store`] — booking store port and in-memory store
//! - [`clock`] — injectable "now"
//! - [`desk`] — application service over store, clock and rules
//! - [`error`] — error types

pub mod clock;
pub mod desk;
pub mod error;
pub mod guard;
pub mod model;
pub mod overlap;
pub mod rules;
pub mod slots;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use desk::{AppointmentBook, AvailabilityWatch, BookingDesk, DeletePolicy};
pub use error::{BookingError, StoreError};
pub use guard::{try_reserve, try_reserve_at, BookingGuard, Conflict, ConflictReason, Reservation};
pub use model::{
    format_time, parse_date, parse_now, parse_time, Booking, BookingId, BookingRequest, NewBooking,
    OwnerId, Service,
};
pub use overlap::{find_double_bookings, DoubleBooking};
pub use rules::{BusinessHours, ScheduleRules, SlotDuration};
pub use slots::{first_slot_start, generate_slots, SlotGenerator};
pub use store::{BookingStore, InMemoryStore, StoreEvent};
