//! Application service tying the pure core to its collaborators.
//!
//! [`BookingDesk`] owns a store, a clock and the schedule rules. It takes a
//! fresh snapshot for every operation, runs the slot generator or the guard on
//! it, and forwards accepted writes to the store. It keeps no state of its own
//! between calls.

use std::str::FromStr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{BookingError, Result, StoreError};
use crate::guard::{try_reserve_at, Reservation};
use crate::model::{format_time, Booking, BookingId, BookingRequest, OwnerId};
use crate::overlap::{find_double_bookings, DoubleBooking};
use crate::rules::ScheduleRules;
use crate::slots::generate_slots;
use crate::store::{BookingStore, StoreEvent};

/// Who may cancel a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletePolicy {
    /// Any viewer may cancel any booking. This is how the shop front desk
    /// works today.
    #[default]
    Shared,
    /// Only the owner recorded in `bookedBy` may cancel.
    OwnerOnly,
}

impl FromStr for DeletePolicy {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(DeletePolicy::Shared),
            "owner-only" | "owner_only" | "owner" => Ok(DeletePolicy::OwnerOnly),
            other => Err(BookingError::InvalidInput(format!(
                "unknown delete policy '{}'. Expected 'shared' or 'owner-only'",
                other
            ))),
        }
    }
}

/// A viewer's bookings split from everyone else's, each sorted by start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentBook {
    pub mine: Vec<Booking>,
    pub others: Vec<Booking>,
}

impl AppointmentBook {
    pub fn partition(bookings: Vec<Booking>, owner: &OwnerId) -> Self {
        let (mut mine, mut others): (Vec<Booking>, Vec<Booking>) =
            bookings.into_iter().partition(|b| &b.booked_by == owner);
        mine.sort_by_key(Booking::starts_at);
        others.sort_by_key(Booking::starts_at);
        Self { mine, others }
    }
}

pub struct BookingDesk<S, C> {
    store: S,
    clock: C,
    rules: ScheduleRules,
    delete_policy: DeletePolicy,
}

impl<S: BookingStore, C: Clock> BookingDesk<S, C> {
    pub fn new(store: S, clock: C, rules: ScheduleRules) -> Self {
        Self {
            store,
            clock,
            rules,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Bookable start times on `date` as of the clock's current instant.
    pub fn available_slots(&self, date: NaiveDate) -> Result<Vec<NaiveTime>> {
        let snapshot = self.store.list()?;
        Ok(generate_slots(&self.rules, date, &snapshot, self.clock.now()))
    }

    /// Validate, guard and append a new booking for `owner`.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank name or contact.
    /// - `Conflict` when the slot is taken, elapsed or outside business hours.
    /// - `Store` when the snapshot read or the append fails.
    pub fn book(&self, request: BookingRequest, owner: &OwnerId) -> Result<Booking> {
        request.validate()?;

        let snapshot = self.store.list()?;
        let now = self.clock.now();
        if let Reservation::Rejected(conflict) =
            try_reserve_at(&self.rules, request.date, request.time, &snapshot, now)
        {
            return Err(BookingError::Conflict(conflict));
        }

        let new = request.into_new_booking(owner.clone(), self.clock.now_utc());
        let id = self.store.append(new.clone())?;
        let booking = Booking::from_new(id, new);

        info!(
            id = %booking.id,
            date = %booking.date,
            time = %format_time(booking.time),
            service = %booking.service,
            owner = %owner,
            "booking accepted"
        );
        Ok(booking)
    }

    /// Delete a booking on behalf of `requester`, subject to the delete policy.
    pub fn cancel(&self, id: BookingId, requester: &OwnerId) -> Result<()> {
        if self.delete_policy == DeletePolicy::OwnerOnly {
            let booking = self
                .store
                .get(id)?
                .ok_or(BookingError::Store(StoreError::NotFound(id)))?;
            if &booking.booked_by != requester {
                debug!(%id, %requester, owner = %booking.booked_by, "cancel refused");
                return Err(BookingError::Unauthorized(format!(
                    "booking {} belongs to another client",
                    id
                )));
            }
        }

        self.store.remove(id)?;
        info!(%id, %requester, "booking cancelled");
        Ok(())
    }

    /// Every booking, split into `owner`'s and everyone else's.
    pub fn appointments(&self, owner: &OwnerId) -> Result<AppointmentBook> {
        Ok(AppointmentBook::partition(self.store.list()?, owner))
    }

    /// Overlapping pairs in the current snapshot.
    pub fn audit(&self) -> Result<Vec<DoubleBooking>> {
        Ok(find_double_bookings(&self.store.list()?, self.rules.slot))
    }

    /// Follow availability on `date`: each store change yields a freshly
    /// generated slot list.
    pub fn watch(&self, date: NaiveDate) -> AvailabilityWatch<'_, S, C> {
        AvailabilityWatch {
            desk: self,
            date,
            events: self.store.subscribe(),
        }
    }
}

/// Listen-and-recompute view of one date's availability.
///
/// Iteration blocks until the store reports a change. The watch borrows the
/// desk, so a store that keeps its senders for its whole lifetime, like
/// [`InMemoryStore`](crate::store::InMemoryStore), never ends the iteration;
/// use [`next_timeout`](Self::next_timeout) to wait with a bound. Iteration
/// ends only for a store whose `subscribe` hands out an already closed channel.
pub struct AvailabilityWatch<'a, S, C> {
    desk: &'a BookingDesk<S, C>,
    date: NaiveDate,
    events: Receiver<StoreEvent>,
}

impl<S: BookingStore, C: Clock> AvailabilityWatch<'_, S, C> {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Availability right now, without waiting for a change.
    pub fn current(&self) -> Result<Vec<NaiveTime>> {
        self.desk.available_slots(self.date)
    }

    /// Wait up to `timeout` for the next change. `None` on timeout or when the
    /// subscription channel is closed.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Result<Vec<NaiveTime>>> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(self.recompute(event)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn recompute(&self, event: StoreEvent) -> Result<Vec<NaiveTime>> {
        debug!(date = %self.date, ?event, "store changed, recomputing slots");
        self.current()
    }
}

impl<S: BookingStore, C: Clock> Iterator for AvailabilityWatch<'_, S, C> {
    type Item = Result<Vec<NaiveTime>>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.recv().ok()?;
        Some(self.recompute(event))
    }
}
