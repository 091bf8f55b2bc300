//! Booking store backed by a single JSON file.
//!
//! The file holds a JSON array of bookings in the stored schema. Every
//! operation re-reads the file, so separate `booker` invocations share one
//! schedule. Writes go to a sibling temp file that is then renamed over the
//! original, so a reader never sees a half-written file. There is no locking:
//! two processes appending at once can still double-book, which
//! `booker audit` detects.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

use booking_engine::store::Subscribers;
use booking_engine::{Booking, BookingId, BookingStore, NewBooking, StoreError, StoreEvent};
use tracing::debug;

pub struct JsonFileStore {
    path: PathBuf,
    subscribers: Subscribers,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<Booking>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, bookings: &[Booking]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(bookings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = bookings.len(), "wrote booking file");
        Ok(())
    }
}

impl BookingStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Booking>, StoreError> {
        self.read_all()
    }

    fn append(&self, booking: NewBooking) -> Result<BookingId, StoreError> {
        let mut bookings = self.read_all()?;
        let id = BookingId::new();
        let booking = Booking::from_new(id, booking);
        bookings.push(booking.clone());
        self.write_all(&bookings)?;
        self.subscribers.publish(StoreEvent::Appended(booking));
        Ok(id)
    }

    fn remove(&self, id: BookingId) -> Result<(), StoreError> {
        let mut bookings = self.read_all()?;
        let before = bookings.len();
        bookings.retain(|b| b.id != id);
        if bookings.len() == before {
            return Err(StoreError::NotFound(id));
        }
        self.write_all(&bookings)?;
        self.subscribers.publish(StoreEvent::Removed(id));
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }
}
