//! Bookable start times for a single date.
//!
//! [`generate_slots`] is a pure function of its inputs: the same date, booking
//! snapshot, rules and `now` always produce the same list. Callers re-run it
//! whenever the selected date or the booking set changes.
//!
//! A slot is offered only if it ends no later than closing time, so with the
//! default 09:00-17:00 hours and 30-minute slots the last start is 16:30.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tracing::debug;

use crate::model::Booking;
use crate::overlap::{overlaps, slot_interval, Interval};
use crate::rules::ScheduleRules;

/// Minute of the day at which scanning starts, before converting to a time.
fn scan_start_minute(rules: &ScheduleRules, date: NaiveDate, now: NaiveDateTime) -> Option<u32> {
    let today = now.date();
    if date < today {
        return None;
    }

    let open = rules.hours.open_hour() * 60;
    if date > today {
        return Some(open);
    }

    // Today before opening scans the same grid as a future date.
    if now.time() < rules.hours.opens_at() {
        return Some(open);
    }

    // Otherwise round the current minute up to the next multiple of the slot
    // width, carrying into the hour.
    let step = rules.slot.minutes();
    let rounded = now.minute().div_ceil(step) * step;
    Some(now.hour() * 60 + rounded)
}

fn time_at_minute(minute_of_day: u32) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(minute_of_day * 60, 0)
}

/// The first start time a scan of `date` would consider, if any slot still fits
/// before closing.
///
/// Past dates return `None`. For a future date, or today before opening, this
/// is the opening time. Later today it is `now` rounded up to the slot width.
pub fn first_slot_start(
    rules: &ScheduleRules,
    date: NaiveDate,
    now: NaiveDateTime,
) -> Option<NaiveTime> {
    let start = scan_start_minute(rules, date, now)?;
    if start + rules.slot.minutes() > rules.hours.close_hour() * 60 {
        return None;
    }
    time_at_minute(start)
}

/// Compute the bookable start times on `date`, ascending.
///
/// `bookings` is the full snapshot; only bookings on `date` are considered.
/// A candidate is dropped if it starts before `now` or if its interval overlaps
/// any booking's interval. An empty result means no availability and is not an
/// error. Past dates always produce an empty result.
pub fn generate_slots(
    rules: &ScheduleRules,
    date: NaiveDate,
    bookings: &[Booking],
    now: NaiveDateTime,
) -> Vec<NaiveTime> {
    let Some(start) = scan_start_minute(rules, date, now) else {
        return Vec::new();
    };

    let step = rules.slot.minutes();
    let close = rules.hours.close_hour() * 60;

    let busy: Vec<Interval> = bookings
        .iter()
        .filter(|b| b.date == date)
        .map(|b| slot_interval(b.date, b.time, rules.slot))
        .collect();

    let mut slots = Vec::new();
    let mut minute = start;

    while minute + step <= close {
        let Some(time) = time_at_minute(minute) else {
            break;
        };
        minute += step;

        let candidate = slot_interval(date, time, rules.slot);
        if candidate.start < now {
            continue;
        }
        if busy.iter().any(|b| overlaps(&candidate, b)) {
            continue;
        }
        slots.push(time);
    }

    debug!(
        %date,
        booked = busy.len(),
        available = slots.len(),
        "generated slots"
    );

    slots
}

/// Holds the schedule rules so callers can generate slots without threading
/// them through every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotGenerator {
    rules: ScheduleRules,
}

impl SlotGenerator {
    pub fn new(rules: ScheduleRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    pub fn generate(
        &self,
        date: NaiveDate,
        bookings: &[Booking],
        now: NaiveDateTime,
    ) -> Vec<NaiveTime> {
        generate_slots(&self.rules, date, bookings, now)
    }
}
