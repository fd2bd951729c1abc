//! Data access for venues, events, event types and bookings.
//!
//! Uniqueness rules and delete guards live behind this trait so that each
//! backend can enforce them atomically: Postgres through unique indexes and
//! row locks inside the delete transaction, the in-memory store under a
//! single write lock.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{
    Booking, BookingDetails, BookingFilter, BookingSearch, Event, EventDetails, EventType,
    NewBooking, NewEvent, NewEventType, NewVenue, Venue,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A uniqueness rule that a write would break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    DuplicateVenue,
    DuplicateEvent,
    DuplicateEventType,
    VenueSlotTaken,
}

impl Conflict {
    pub fn message(self) -> &'static str {
        match self {
            Conflict::DuplicateVenue => "A venue with the same name and location already exists.",
            Conflict::DuplicateEvent => "An event with the same name and date already exists.",
            Conflict::DuplicateEventType => "An event type with the same name already exists.",
            Conflict::VenueSlotTaken => "A booking for that date and venue already exists.",
        }
    }
}

/// A delete refused because a booking after "now" still depends on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBlocked {
    Venue,
    Event,
}

impl DeleteBlocked {
    pub fn message(self) -> &'static str {
        match self {
            DeleteBlocked::Venue => "Cannot delete: active bookings exist.",
            DeleteBlocked::Event => {
                "This event cannot be deleted because there are active bookings."
            }
        }
    }
}

/// A foreign key pointing at a row that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReference {
    Event,
    Venue,
    EventType,
}

impl MissingReference {
    pub fn field(self) -> &'static str {
        match self {
            MissingReference::Event => "event_id",
            MissingReference::Venue => "venue_id",
            MissingReference::EventType => "event_type_id",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MissingReference::Event => "The selected event does not exist.",
            MissingReference::Venue => "The selected venue does not exist.",
            MissingReference::EventType => "The selected event type does not exist.",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{}", .0.message())]
    Conflict(Conflict),

    #[error("{}", .0.message())]
    DeleteBlocked(DeleteBlocked),

    #[error("{}", .0.message())]
    MissingReference(MissingReference),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn list_venues(&self) -> StoreResult<Vec<Venue>>;
    async fn find_venue(&self, id: i64) -> StoreResult<Option<Venue>>;
    async fn insert_venue(&self, venue: &NewVenue) -> StoreResult<Venue>;
    async fn update_venue(&self, id: i64, venue: &NewVenue) -> StoreResult<Venue>;
    /// Removes the venue and its past bookings unless a booking after `now` exists.
    async fn delete_venue(&self, id: i64, now: NaiveDateTime) -> StoreResult<Venue>;

    async fn list_event_types(&self) -> StoreResult<Vec<EventType>>;
    async fn insert_event_type(&self, event_type: &NewEventType) -> StoreResult<EventType>;

    async fn list_events(&self) -> StoreResult<Vec<EventDetails>>;
    async fn find_event(&self, id: i64) -> StoreResult<Option<EventDetails>>;
    async fn insert_event(&self, event: &NewEvent) -> StoreResult<Event>;
    async fn update_event(&self, id: i64, event: &NewEvent) -> StoreResult<Event>;
    /// Removes the event and its past bookings unless a booking after `now` exists.
    async fn delete_event(&self, id: i64, now: NaiveDateTime) -> StoreResult<Event>;

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<BookingDetails>>;
    async fn search_bookings(&self, search: &BookingSearch) -> StoreResult<Vec<BookingDetails>>;
    async fn find_booking(&self, id: i64) -> StoreResult<Option<BookingDetails>>;
    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking>;
    /// Fails with `NotFound` when the row vanished after it was read.
    async fn update_booking(&self, id: i64, booking: &NewBooking) -> StoreResult<Booking>;
    /// `false` when there was nothing to delete.
    async fn delete_booking(&self, id: i64) -> StoreResult<bool>;
}
