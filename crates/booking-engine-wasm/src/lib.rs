//! WASM bindings for booking-engine.
//!
//! Exposes slot generation, the booking guard and the double-booking audit to
//! the browser front end via `wasm-bindgen`. All complex types are passed as
//! JSON strings. Bookings use the stored schema (`date`, `time`, `clientName`,
//! `clientContact`, `service`, `bookedBy`, `createdAt`, `id`).
//!
//! The browser supplies its own wall-clock "now" so the engine stays
//! deterministic.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p booking-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/pkg \
//!   target/wasm32-unknown-unknown/release/booking_engine_wasm.wasm
//! ```

use booking_engine::{
    find_double_bookings, format_time, parse_date, parse_time, Booking, Conflict, Reservation,
    ScheduleRules, Service,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ReservationDto {
    Accepted,
    Rejected { conflict: Conflict, message: String },
}

impl From<Reservation> for ReservationDto {
    fn from(r: Reservation) -> Self {
        match r {
            Reservation::Accepted => ReservationDto::Accepted,
            Reservation::Rejected(conflict) => ReservationDto::Rejected {
                message: conflict.user_message().to_string(),
                conflict,
            },
        }
    }
}

#[derive(Serialize)]
struct DoubleBookingDto {
    first: Booking,
    second: Booking,
    overlap_minutes: i64,
}

// ---------------------------------------------------------------------------
// Helpers: parse inputs, with errors as plain strings
// ---------------------------------------------------------------------------

/// Parse a local "now" such as "2024-06-10T10:07" or "2024-06-10T10:07:30".
fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    booking_engine::parse_now(s).map_err(|e| e.to_string())
}

fn parse_bookings_json(json: &str) -> Result<Vec<Booking>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid bookings JSON: {}", e))
}

fn rules(open_hour: u32, close_hour: u32, slot_minutes: u32) -> Result<ScheduleRules, String> {
    ScheduleRules::from_parts(open_hour, close_hour, slot_minutes).map_err(|e| e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn generate_slots_json(
    date: &str,
    bookings_json: &str,
    now: &str,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
) -> Result<String, String> {
    let rules = rules(open_hour, close_hour, slot_minutes)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let bookings = parse_bookings_json(bookings_json)?;
    let now = parse_now(now)?;

    let slots: Vec<String> = booking_engine::generate_slots(&rules, date, &bookings, now)
        .into_iter()
        .map(format_time)
        .collect();
    to_json(&slots)
}

#[allow(clippy::too_many_arguments)]
fn try_reserve_json(
    date: &str,
    time: &str,
    bookings_json: &str,
    now: Option<&str>,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
) -> Result<String, String> {
    let rules = rules(open_hour, close_hour, slot_minutes)?;
    let date = parse_date(date).map_err(|e| e.to_string())?;
    let time = parse_time(time).map_err(|e| e.to_string())?;
    let bookings = parse_bookings_json(bookings_json)?;

    let reservation = match now {
        Some(now) => booking_engine::try_reserve_at(&rules, date, time, &bookings, parse_now(now)?),
        None => booking_engine::try_reserve(&rules, date, time, &bookings),
    };
    to_json(&ReservationDto::from(reservation))
}

fn find_double_bookings_json(bookings_json: &str, slot_minutes: u32) -> Result<String, String> {
    let slot = booking_engine::SlotDuration::new(slot_minutes).map_err(|e| e.to_string())?;
    let bookings = parse_bookings_json(bookings_json)?;

    let dtos: Vec<DoubleBookingDto> = find_double_bookings(&bookings, slot)
        .into_iter()
        .map(|d| DoubleBookingDto {
            first: d.first,
            second: d.second,
            overlap_minutes: d.overlap_minutes,
        })
        .collect();
    to_json(&dtos)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Bookable start times on `date` as a JSON array of `"HH:MM"` strings.
///
/// # Arguments
/// - `date` -- Calendar date (e.g., "2024-06-10")
/// - `bookings_json` -- JSON array of every booking (not pre-filtered by date)
/// - `now` -- Local wall-clock datetime (e.g., "2024-06-10T10:07")
/// - `open_hour`, `close_hour` -- Business hours (e.g., 9 and 17)
/// - `slot_minutes` -- Slot width (e.g., 30)
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    date: &str,
    bookings_json: &str,
    now: &str,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
) -> Result<String, JsValue> {
    generate_slots_json(date, bookings_json, now, open_hour, close_hour, slot_minutes)
        .map_err(|e| JsValue::from_str(&e))
}

/// Re-check a proposed booking against the current bookings just before writing.
///
/// Returns `{"status":"accepted"}` or
/// `{"status":"rejected","conflict":{...},"message":"..."}`. When `now` is given,
/// elapsed starts and slots outside business hours are rejected as well.
#[wasm_bindgen(js_name = "tryReserve")]
#[allow(clippy::too_many_arguments)]
pub fn try_reserve(
    date: &str,
    time: &str,
    bookings_json: &str,
    now: Option<String>,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
) -> Result<String, JsValue> {
    try_reserve_json(
        date,
        time,
        bookings_json,
        now.as_deref(),
        open_hour,
        close_hour,
        slot_minutes,
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Pairs of stored bookings that overlap, as a JSON array of
/// `{first, second, overlap_minutes}`.
#[wasm_bindgen(js_name = "findDoubleBookings")]
pub fn find_double_bookings_js(bookings_json: &str, slot_minutes: u32) -> Result<String, JsValue> {
    find_double_bookings_json(bookings_json, slot_minutes).map_err(|e| JsValue::from_str(&e))
}

/// The service menu as a JSON array of display names.
#[wasm_bindgen(js_name = "services")]
pub fn services() -> String {
    let names: Vec<&str> = Service::ALL.iter().map(Service::name).collect();
    to_json(&names).unwrap_or_else(|_| "[]".to_string())
}
