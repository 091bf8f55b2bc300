//! Injectable "now" source.

use chrono::{DateTime, Local, NaiveDateTime, Utc};

/// Supplies the current instant. Slot generation and the guard work on the
/// local wall clock; `now_utc` stamps `createdAt`.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn now_utc(&self) -> DateTime<Utc>;
}

/// The process's real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one local instant. `now_utc` treats that instant as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}
