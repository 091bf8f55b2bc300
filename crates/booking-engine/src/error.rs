//! Error types for booking-engine operations.

use thiserror::Error;

use crate::guard::Conflict;
use crate::model::BookingId;

/// Failures reported by a [`BookingStore`](crate::store::BookingStore).
///
/// These are propagated to the caller unchanged; the engine never retries.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store data error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum BookingError {
    /// Malformed date or time, bad business hours, non-positive slot duration,
    /// or an incomplete booking request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The proposed slot is no longer free. Regenerate slots before retrying.
    #[error("{0}")]
    Conflict(Conflict),

    #[error("Not allowed: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, BookingError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
