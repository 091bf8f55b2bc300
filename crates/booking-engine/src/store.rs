//! The booking store port.
//!
//! The engine never persists anything itself. It reads snapshots through
//! [`BookingStore::list`], hands accepted bookings to [`BookingStore::append`],
//! and listens for changes through [`BookingStore::subscribe`]. There is no
//! update operation: bookings are immutable once created.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{Booking, BookingId, NewBooking};

/// A change to the shared booking set.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Appended(Booking),
    Removed(BookingId),
}

pub trait BookingStore: Send + Sync {
    /// Snapshot of every booking, in no particular order.
    fn list(&self) -> Result<Vec<Booking>, StoreError>;

    /// Store a new booking and return its assigned id.
    fn append(&self, booking: NewBooking) -> Result<BookingId, StoreError>;

    /// Delete a booking. Returns `StoreError::NotFound` if it does not exist.
    fn remove(&self, id: BookingId) -> Result<(), StoreError>;

    /// Receive every subsequent change. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> Receiver<StoreEvent>;

    fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.list()?.into_iter().find(|b| b.id == id))
    }
}

impl<T: BookingStore + ?Sized> BookingStore for Arc<T> {
    fn list(&self) -> Result<Vec<Booking>, StoreError> {
        (**self).list()
    }

    fn append(&self, booking: NewBooking) -> Result<BookingId, StoreError> {
        (**self).append(booking)
    }

    fn remove(&self, id: BookingId) -> Result<(), StoreError> {
        (**self).remove(id)
    }

    fn subscribe(&self) -> Receiver<StoreEvent> {
        (**self).subscribe()
    }

    fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        (**self).get(id)
    }
}

/// Fan-out of store events to live subscribers.
///
/// Subscribers whose receiver has been dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Mutex<Vec<Sender<StoreEvent>>>,
}

impl Subscribers {
    pub fn subscribe(&self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders().push(tx);
        rx
    }

    pub fn publish(&self, event: StoreEvent) {
        let mut senders = self.senders();
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        debug!(subscribers = senders.len(), ?event, "published store event");
    }

    /// Lock the sender list, recovering it if a previous holder panicked.
    fn senders(&self) -> MutexGuard<'_, Vec<Sender<StoreEvent>>> {
        self.senders.lock().unwrap_or_else(|poisoned| {
            warn!("subscriber list lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

/// Reference store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    bookings: RwLock<Vec<Booking>>,
    subscribers: Subscribers,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing bookings without publishing events.
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        Self {
            bookings: RwLock::new(bookings),
            subscribers: Subscribers::default(),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("booking store lock poisoned".to_string())
}

impl BookingStore for InMemoryStore {
    fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().map_err(|_| poisoned())?;
        Ok(bookings.clone())
    }

    fn append(&self, booking: NewBooking) -> Result<BookingId, StoreError> {
        let id = BookingId::new();
        let booking = Booking::from_new(id, booking);
        {
            let mut bookings = self.bookings.write().map_err(|_| poisoned())?;
            bookings.push(booking.clone());
        }
        self.subscribers.publish(StoreEvent::Appended(booking));
        Ok(id)
    }

    fn remove(&self, id: BookingId) -> Result<(), StoreError> {
        {
            let mut bookings = self.bookings.write().map_err(|_| poisoned())?;
            let before = bookings.len();
            bookings.retain(|b| b.id != id);
            if bookings.len() == before {
                return Err(StoreError::NotFound(id));
            }
        }
        self.subscribers.publish(StoreEvent::Removed(id));
        Ok(())
    }

    fn subscribe(&self) -> Receiver<StoreEvent> {
        self.subscribers.subscribe()
    }
}
