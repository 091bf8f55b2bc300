//! The overlap predicate shared by slot generation and the booking guard.
//!
//! Every slot and every booking is a half-open interval `[start, start + slot)`.
//! Two intervals overlap when `a.start < b.end && b.start < a.end`. Adjacent
//! intervals, where one ends exactly when the other starts, do NOT overlap.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::Booking;
use crate::rules::SlotDuration;

/// A half-open interval on the local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        overlaps(self, other)
    }
}

/// Build the interval occupied by a slot or booking starting at `date` `time`.
pub fn slot_interval(date: NaiveDate, time: NaiveTime, slot: SlotDuration) -> Interval {
    let start = date.and_time(time);
    Interval {
        start,
        end: start + slot.as_duration(),
    }
}

/// Whether two half-open intervals share at least one instant.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}

/// Width of the shared part of two intervals, or 0 when they do not overlap.
pub fn overlap_minutes(a: &Interval, b: &Interval) -> i64 {
    if !overlaps(a, b) {
        return 0;
    }
    (a.end.min(b.end) - a.start.max(b.start)).num_minutes()
}

/// Bookings on `date` whose interval overlaps `candidate`.
pub fn overlapping_bookings<'a>(
    candidate: &Interval,
    date: NaiveDate,
    bookings: &'a [Booking],
    slot: SlotDuration,
) -> impl Iterator<Item = &'a Booking> + 'a {
    let candidate = *candidate;
    bookings
        .iter()
        .filter(move |b| b.date == date)
        .filter(move |b| overlaps(&candidate, &slot_interval(b.date, b.time, slot)))
}

/// Two stored bookings that occupy overlapping time.
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleBooking {
    pub first: Booking,
    pub second: Booking,
    pub overlap_minutes: i64,
}

/// Audit a snapshot for pairs of same-date bookings that overlap.
///
/// The guard's re-check is best-effort, so two racing writers can still both
/// land. Each offending pair is reported once, ordered by the earlier booking's
/// start.
pub fn find_double_bookings(bookings: &[Booking], slot: SlotDuration) -> Vec<DoubleBooking> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by_key(|b| (b.starts_at(), b.created_at));

    let mut found = Vec::new();

    for (i, a) in sorted.iter().enumerate() {
        let a_interval = slot_interval(a.date, a.time, slot);
        for b in &sorted[i + 1..] {
            let b_interval = slot_interval(b.date, b.time, slot);
            // Sorted by start, so nothing later can reach back into `a`.
            if b_interval.start >= a_interval.end {
                break;
            }
            if a.date == b.date && overlaps(&a_interval, &b_interval) {
                found.push(DoubleBooking {
                    first: (*a).clone(),
                    second: (*b).clone(),
                    overlap_minutes: overlap_minutes(&a_interval, &b_interval),
                });
            }
        }
    }

    found
}
