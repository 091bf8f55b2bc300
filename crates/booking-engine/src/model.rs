//! Booking records and the request shape they are created from.
//!
//! The serialized form of [`Booking`] is the schema every storage layer must
//! preserve: camelCase keys, `date` as `YYYY-MM-DD`, `time` as `HH:MM`, and
//! `createdAt` as RFC 3339.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BookingError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Store-assigned identifier of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for BookingId {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| BookingError::InvalidInput(format!("invalid booking id '{}': {}", s, e)))
    }
}

/// Opaque owner token from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The shop's service menu. Every service takes exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Service {
    #[default]
    Haircut,
    #[serde(rename = "Beard Trim")]
    BeardTrim,
    Shave,
    #[serde(rename = "Haircut & Beard Trim")]
    HaircutAndBeardTrim,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Haircut,
        Service::BeardTrim,
        Service::Shave,
        Service::HaircutAndBeardTrim,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Haircut => "Haircut",
            Service::BeardTrim => "Beard Trim",
            Service::Shave => "Shave",
            Service::HaircutAndBeardTrim => "Haircut & Beard Trim",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Service::ALL
            .into_iter()
            .find(|service| service.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let menu: Vec<&str> = Service::ALL.iter().map(Service::name).collect();
                BookingError::InvalidInput(format!(
                    "unknown service '{}'. Available services: {}",
                    wanted,
                    menu.join(", ")
                ))
            })
    }
}

/// An accepted, stored appointment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(with = "time_format")]
    pub time: NaiveTime,
    pub client_name: String,
    pub client_contact: String,
    pub service: Service,
    pub booked_by: OwnerId,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(id: BookingId, new: NewBooking) -> Self {
        Self {
            id,
            date: new.date,
            time: new.time,
            client_name: new.client_name,
            client_contact: new.client_contact,
            service: new.service,
            booked_by: new.booked_by,
            created_at: new.created_at,
        }
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A booking that passed the guard and is about to be appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(with = "time_format")]
    pub time: NaiveTime,
    pub client_name: String,
    pub client_contact: String,
    pub service: Service,
    pub booked_by: OwnerId,
    pub created_at: DateTime<Utc>,
}

/// What a client fills in on the booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub client_name: String,
    pub client_contact: String,
    pub service: Service,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl BookingRequest {
    /// Reject blank name or contact. Date, time and service are typed and so
    /// always present.
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() || self.client_contact.trim().is_empty() {
            return Err(BookingError::InvalidInput(
                "please fill in all fields".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_new_booking(self, booked_by: OwnerId, created_at: DateTime<Utc>) -> NewBooking {
        NewBooking {
            date: self.date,
            time: self.time,
            client_name: self.client_name.trim().to_string(),
            client_contact: self.client_contact.trim().to_string(),
            service: self.service,
            booked_by,
            created_at,
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| BookingError::InvalidInput(format!("invalid date '{}': {}", s, e)))
}

/// Parse an `HH:MM` wall-clock time.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|e| BookingError::InvalidInput(format!("invalid time '{}': {}", s, e)))
}

/// Parse a local wall-clock instant, `YYYY-MM-DDTHH:MM` with optional seconds.
pub fn parse_now(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|e| BookingError::InvalidInput(format!("invalid datetime '{}': {}", s, e)))
}

/// Render a time of day the way bookings store it.
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(super::DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDate::parse_from_str(&raw, super::DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

mod time_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(super::TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, super::TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}
