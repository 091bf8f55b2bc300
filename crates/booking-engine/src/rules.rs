//! Business hours and slot granularity.
//!
//! Both values are process-wide configuration. They are validated once at
//! construction so the slot generator and the guard can rely on
//! `open_hour < close_hour` and a positive slot width.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, Result};

/// Opening and closing hour of the shop, on the local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawHours", into = "RawHours")]
pub struct BusinessHours {
    open_hour: u32,
    close_hour: u32,
}

#[derive(Serialize, Deserialize)]
struct RawHours {
    open_hour: u32,
    close_hour: u32,
}

impl BusinessHours {
    /// # Errors
    /// Returns `BookingError::InvalidInput` unless `0 <= open_hour < close_hour <= 23`.
    pub fn new(open_hour: u32, close_hour: u32) -> Result<Self> {
        if open_hour > 23 || close_hour > 23 {
            return Err(BookingError::InvalidInput(format!(
                "business hours must be within 0-23, got {}-{}",
                open_hour, close_hour
            )));
        }
        if close_hour <= open_hour {
            return Err(BookingError::InvalidInput(format!(
                "closing hour {} must be after opening hour {}",
                close_hour, open_hour
            )));
        }
        Ok(Self {
            open_hour,
            close_hour,
        })
    }

    pub fn open_hour(&self) -> u32 {
        self.open_hour
    }

    pub fn close_hour(&self) -> u32 {
        self.close_hour
    }

    pub fn opens_at(&self) -> NaiveTime {
        NaiveTime::MIN + Duration::hours(self.open_hour as i64)
    }

    pub fn closes_at(&self) -> NaiveTime {
        NaiveTime::MIN + Duration::hours(self.close_hour as i64)
    }

    /// Length of the business day in minutes.
    pub fn span_minutes(&self) -> u32 {
        (self.close_hour - self.open_hour) * 60
    }
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            open_hour: 9,
            close_hour: 17,
        }
    }
}

impl TryFrom<RawHours> for BusinessHours {
    type Error = BookingError;

    fn try_from(raw: RawHours) -> Result<Self> {
        Self::new(raw.open_hour, raw.close_hour)
    }
}

impl From<BusinessHours> for RawHours {
    fn from(hours: BusinessHours) -> Self {
        Self {
            open_hour: hours.open_hour,
            close_hour: hours.close_hour,
        }
    }
}

/// Width of every slot and every booking, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlotDuration(u32);

impl SlotDuration {
    /// # Errors
    /// Returns `BookingError::InvalidInput` for a zero duration.
    pub fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 {
            return Err(BookingError::InvalidInput(
                "slot duration must be a positive number of minutes".to_string(),
            ));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::minutes(self.0 as i64)
    }
}

impl Default for SlotDuration {
    fn default() -> Self {
        Self(30)
    }
}

impl TryFrom<u32> for SlotDuration {
    type Error = BookingError;

    fn try_from(minutes: u32) -> Result<Self> {
        Self::new(minutes)
    }
}

impl From<SlotDuration> for u32 {
    fn from(slot: SlotDuration) -> Self {
        slot.0
    }
}

/// The configuration shared by slot generation and the booking guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleRules {
    pub hours: BusinessHours,
    #[serde(rename = "slot_minutes")]
    pub slot: SlotDuration,
}

impl ScheduleRules {
    /// Combine validated hours and slot width.
    ///
    /// # Errors
    /// Returns `BookingError::InvalidInput` when a single slot cannot fit inside
    /// the business day.
    pub fn new(hours: BusinessHours, slot: SlotDuration) -> Result<Self> {
        if slot.minutes() > hours.span_minutes() {
            return Err(BookingError::InvalidInput(format!(
                "a {}-minute slot does not fit in business hours {}:00-{}:00",
                slot.minutes(),
                hours.open_hour(),
                hours.close_hour()
            )));
        }
        Ok(Self { hours, slot })
    }

    /// Build rules from raw integers, validating each part.
    pub fn from_parts(open_hour: u32, close_hour: u32, slot_minutes: u32) -> Result<Self> {
        Self::new(
            BusinessHours::new(open_hour, close_hour)?,
            SlotDuration::new(slot_minutes)?,
        )
    }
}
