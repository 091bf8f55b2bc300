//! Write-time re-check of a proposed booking against the current snapshot.
//!
//! The slot list a client picked from can be stale by the time they submit:
//! another viewer may have taken the slot, or the clock may have moved past it.
//! The guard runs immediately before the store append and rejects the proposal
//! when its interval overlaps any booking on the same date.
//!
//! The check is advisory. The store offers no conditional write, so two writers
//! holding the same stale snapshot can both pass; see
//! [`find_double_bookings`](crate::overlap::find_double_bookings).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::model::{format_time, Booking, BookingId};
use crate::overlap::{overlap_minutes, overlapping_bookings, slot_interval};
use crate::rules::ScheduleRules;

/// Why a proposed booking was turned down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    /// An existing booking occupies part of the proposed interval.
    Overlap {
        existing: BookingId,
        #[serde(serialize_with = "serialize_time")]
        existing_time: NaiveTime,
        overlap_minutes: i64,
    },
    /// The proposed start is already in the past.
    Elapsed,
    /// The proposed interval does not fit inside business hours.
    OutsideHours,
}

fn serialize_time<S: serde::Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_time(*time))
}

/// A rejected proposal, with enough detail to tell the client the slot is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_time")]
    pub time: NaiveTime,
    pub reason: ConflictReason,
}

impl Conflict {
    /// The message shown to the client. The same for every reason: in each case
    /// they must pick again from a freshly generated list.
    pub fn user_message(&self) -> &'static str {
        "This time slot is no longer available. Please choose another one."
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let when = format!("{} {}", self.date, format_time(self.time));
        match &self.reason {
            ConflictReason::Overlap {
                existing_time,
                overlap_minutes,
                ..
            } => write!(
                f,
                "Booking conflict at {}: overlaps the {} booking by {} minutes",
                when,
                format_time(*existing_time),
                overlap_minutes
            ),
            ConflictReason::Elapsed => write!(f, "Booking conflict at {}: slot has already started", when),
            ConflictReason::OutsideHours => {
                write!(f, "Booking conflict at {}: slot is outside business hours", when)
            }
        }
    }
}

/// Outcome of a reservation attempt. Both variants are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    Accepted,
    Rejected(Conflict),
}

impl Reservation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Reservation::Accepted)
    }

    pub fn into_result(self) -> std::result::Result<(), Conflict> {
        match self {
            Reservation::Accepted => Ok(()),
            Reservation::Rejected(conflict) => Err(conflict),
        }
    }
}

/// Check `date` `time` against every booking in the snapshot on that date.
///
/// Uses the same half-open overlap rule as slot generation, which covers exact
/// `(date, time)` equality as well as off-grid starts that partially overlap.
/// The first overlapping booking in snapshot order is reported.
pub fn try_reserve(
    rules: &ScheduleRules,
    date: NaiveDate,
    time: NaiveTime,
    bookings: &[Booking],
) -> Reservation {
    let proposed = slot_interval(date, time, rules.slot);

    match overlapping_bookings(&proposed, date, bookings, rules.slot).next() {
        Some(existing) => {
            let existing_interval = slot_interval(existing.date, existing.time, rules.slot);
            let conflict = Conflict {
                date,
                time,
                reason: ConflictReason::Overlap {
                    existing: existing.id,
                    existing_time: existing.time,
                    overlap_minutes: overlap_minutes(&proposed, &existing_interval),
                },
            };
            debug!(%date, time = %format_time(time), existing = %existing.id, "reservation rejected: overlap");
            Reservation::Rejected(conflict)
        }
        None => Reservation::Accepted,
    }
}

/// Like [`try_reserve`], but also rejects a start that has already elapsed at
/// `now` or an interval that does not fit inside business hours.
pub fn try_reserve_at(
    rules: &ScheduleRules,
    date: NaiveDate,
    time: NaiveTime,
    bookings: &[Booking],
    now: NaiveDateTime,
) -> Reservation {
    let proposed = slot_interval(date, time, rules.slot);

    if proposed.start < now {
        debug!(%date, time = %format_time(time), %now, "reservation rejected: elapsed");
        return Reservation::Rejected(Conflict {
            date,
            time,
            reason: ConflictReason::Elapsed,
        });
    }

    let opens = date.and_time(rules.hours.opens_at());
    let closes = date.and_time(rules.hours.closes_at());
    if proposed.start < opens || proposed.end > closes {
        debug!(%date, time = %format_time(time), "reservation rejected: outside business hours");
        return Reservation::Rejected(Conflict {
            date,
            time,
            reason: ConflictReason::OutsideHours,
        });
    }

    try_reserve(rules, date, time, bookings)
}

/// Holds the schedule rules for callers that guard many writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingGuard {
    rules: ScheduleRules,
}

impl BookingGuard {
    pub fn new(rules: ScheduleRules) -> Self {
        Self { rules }
    }

    pub fn try_reserve(&self, date: NaiveDate, time: NaiveTime, bookings: &[Booking]) -> Reservation {
        try_reserve(&self.rules, date, time, bookings)
    }

    pub fn try_reserve_at(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> Reservation {
        try_reserve_at(&self.rules, date, time, bookings, now)
    }
}
