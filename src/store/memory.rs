use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{Conflict, DeleteBlocked, MissingReference, Store, StoreError, StoreResult};
use crate::models::{
    Booking, BookingDetails, BookingFilter, BookingSearch, Event, EventDetails, EventType,
    NewBooking, NewEvent, NewEventType, NewVenue, Venue,
};

/// Process-local store for development runs and tests.
///
/// Every operation holds the lock for its whole check-and-write, which gives
/// the same atomicity the Postgres store gets from indexes and transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    venues: BTreeMap<i64, Venue>,
    event_types: BTreeMap<i64, EventType>,
    events: BTreeMap<i64, Event>,
    bookings: BTreeMap<i64, Booking>,
    last_id: LastIds,
}

#[derive(Default)]
struct LastIds {
    venue: i64,
    event_type: i64,
    event: i64,
    booking: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn event_details(&self, event: &Event) -> Option<EventDetails> {
        let event_type = self.event_types.get(&event.event_type_id)?;
        Some(EventDetails {
            event_id: event.event_id,
            event_name: event.event_name.clone(),
            event_date: event.event_date,
            description: event.description.clone(),
            event_type_id: event.event_type_id,
            event_type_name: event_type.event_type_name.clone(),
        })
    }

    fn booking_details(&self, booking: &Booking) -> Option<BookingDetails> {
        let event = self.events.get(&booking.event_id)?;
        let event_type = self.event_types.get(&event.event_type_id)?;
        let venue = self.venues.get(&booking.venue_id)?;
        Some(BookingDetails {
            booking_id: booking.booking_id,
            booking_date: booking.booking_date,
            event_id: event.event_id,
            event_name: event.event_name.clone(),
            event_date: event.event_date,
            event_type_id: event_type.event_type_id,
            event_type_name: event_type.event_type_name.clone(),
            venue_id: venue.venue_id,
            venue_name: venue.venue_name.clone(),
            location: venue.location.clone(),
            venue_availability: venue.availability,
        })
    }

    fn sorted_bookings(&self, keep: impl Fn(&BookingDetails) -> bool) -> Vec<BookingDetails> {
        let mut rows: Vec<BookingDetails> = self
            .bookings
            .values()
            .filter_map(|b| self.booking_details(b))
            .filter(|d| keep(d))
            .collect();
        rows.sort_by(|a, b| {
            a.booking_date
                .cmp(&b.booking_date)
                .then(a.booking_id.cmp(&b.booking_id))
        });
        rows
    }

    fn check_venue(&self, id: Option<i64>, venue: &NewVenue) -> StoreResult<()> {
        let duplicate = self
            .venues
            .values()
            .any(|v| Some(v.venue_id) != id && venue.matches_identity(v));
        if duplicate {
            return Err(StoreError::Conflict(Conflict::DuplicateVenue));
        }
        Ok(())
    }

    fn check_event(&self, id: Option<i64>, event: &NewEvent) -> StoreResult<()> {
        if !self.event_types.contains_key(&event.event_type_id) {
            return Err(StoreError::MissingReference(MissingReference::EventType));
        }
        let duplicate = self
            .events
            .values()
            .any(|e| Some(e.event_id) != id && event.matches_identity(e));
        if duplicate {
            return Err(StoreError::Conflict(Conflict::DuplicateEvent));
        }
        Ok(())
    }

    fn check_booking(&self, id: Option<i64>, booking: &NewBooking) -> StoreResult<()> {
        if !self.events.contains_key(&booking.event_id) {
            return Err(StoreError::MissingReference(MissingReference::Event));
        }
        if !self.venues.contains_key(&booking.venue_id) {
            return Err(StoreError::MissingReference(MissingReference::Venue));
        }
        let taken = self
            .bookings
            .values()
            .any(|b| Some(b.booking_id) != id && booking.takes_slot_of(b));
        if taken {
            return Err(StoreError::Conflict(Conflict::VenueSlotTaken));
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables.venues.values().cloned().collect())
    }

    async fn find_venue(&self, id: i64) -> StoreResult<Option<Venue>> {
        let tables = self.tables.read().await;
        Ok(tables.venues.get(&id).cloned())
    }

    async fn insert_venue(&self, venue: &NewVenue) -> StoreResult<Venue> {
        let mut tables = self.tables.write().await;
        tables.check_venue(None, venue)?;

        let row = Venue {
            venue_id: next(&mut tables.last_id.venue),
            venue_name: venue.venue_name.clone(),
            location: venue.location.clone(),
            capacity: venue.capacity,
            availability: venue.availability,
            image_url: venue.image_url.clone(),
        };
        tables.venues.insert(row.venue_id, row.clone());
        Ok(row)
    }

    async fn update_venue(&self, id: i64, venue: &NewVenue) -> StoreResult<Venue> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&id) {
            return Err(StoreError::NotFound("Venue"));
        }
        tables.check_venue(Some(id), venue)?;

        let row = Venue {
            venue_id: id,
            venue_name: venue.venue_name.clone(),
            location: venue.location.clone(),
            capacity: venue.capacity,
            availability: venue.availability,
            image_url: venue.image_url.clone(),
        };
        tables.venues.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_venue(&self, id: i64, now: NaiveDateTime) -> StoreResult<Venue> {
        let mut tables = self.tables.write().await;
        if !tables.venues.contains_key(&id) {
            return Err(StoreError::NotFound("Venue"));
        }
        let active = tables
            .bookings
            .values()
            .any(|b| b.venue_id == id && b.booking_date > now);
        if active {
            return Err(StoreError::DeleteBlocked(DeleteBlocked::Venue));
        }

        tables.bookings.retain(|_, b| b.venue_id != id);
        tables.venues.remove(&id).ok_or(StoreError::NotFound("Venue"))
    }

    async fn list_event_types(&self) -> StoreResult<Vec<EventType>> {
        let tables = self.tables.read().await;
        let mut types: Vec<EventType> = tables.event_types.values().cloned().collect();
        types.sort_by(|a, b| a.event_type_name.cmp(&b.event_type_name));
        Ok(types)
    }

    async fn insert_event_type(&self, event_type: &NewEventType) -> StoreResult<EventType> {
        let mut tables = self.tables.write().await;
        if tables
            .event_types
            .values()
            .any(|t| event_type.matches_identity(t))
        {
            return Err(StoreError::Conflict(Conflict::DuplicateEventType));
        }

        let row = EventType {
            event_type_id: next(&mut tables.last_id.event_type),
            event_type_name: event_type.event_type_name.clone(),
        };
        tables.event_types.insert(row.event_type_id, row.clone());
        Ok(row)
    }

    async fn list_events(&self) -> StoreResult<Vec<EventDetails>> {
        let tables = self.tables.read().await;
        let mut events: Vec<EventDetails> = tables
            .events
            .values()
            .filter_map(|e| tables.event_details(e))
            .collect();
        events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.event_id.cmp(&b.event_id)));
        Ok(events)
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<EventDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.events.get(&id).and_then(|e| tables.event_details(e)))
    }

    async fn insert_event(&self, event: &NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        tables.check_event(None, event)?;

        let row = Event {
            event_id: next(&mut tables.last_id.event),
            event_name: event.event_name.clone(),
            event_date: event.event_date,
            description: event.description.clone(),
            event_type_id: event.event_type_id,
        };
        tables.events.insert(row.event_id, row.clone());
        Ok(row)
    }

    async fn update_event(&self, id: i64, event: &NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&id) {
            return Err(StoreError::NotFound("Event"));
        }
        tables.check_event(Some(id), event)?;

        let row = Event {
            event_id: id,
            event_name: event.event_name.clone(),
            event_date: event.event_date,
            description: event.description.clone(),
            event_type_id: event.event_type_id,
        };
        tables.events.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_event(&self, id: i64, now: NaiveDateTime) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&id) {
            return Err(StoreError::NotFound("Event"));
        }
        let active = tables
            .bookings
            .values()
            .any(|b| b.event_id == id && b.booking_date > now);
        if active {
            return Err(StoreError::DeleteBlocked(DeleteBlocked::Event));
        }

        tables.bookings.retain(|_, b| b.event_id != id);
        tables.events.remove(&id).ok_or(StoreError::NotFound("Event"))
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<BookingDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_bookings(|b| filter.matches(b)))
    }

    async fn search_bookings(&self, search: &BookingSearch) -> StoreResult<Vec<BookingDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_bookings(|b| search.matches(b)))
    }

    async fn find_booking(&self, id: i64) -> StoreResult<Option<BookingDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.get(&id).and_then(|b| tables.booking_details(b)))
    }

    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;
        tables.check_booking(None, booking)?;

        let row = Booking {
            booking_id: next(&mut tables.last_id.booking),
            event_id: booking.event_id,
            venue_id: booking.venue_id,
            booking_date: booking.booking_date,
        };
        tables.bookings.insert(row.booking_id, row.clone());
        Ok(row)
    }

    async fn update_booking(&self, id: i64, booking: &NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.write().await;
        if !tables.bookings.contains_key(&id) {
            return Err(StoreError::NotFound("Booking"));
        }
        tables.check_booking(Some(id), booking)?;

        let row = Booking {
            booking_id: id,
            event_id: booking.event_id,
            venue_id: booking.venue_id,
            booking_date: booking.booking_date,
        };
        tables.bookings.insert(id, row.clone());
        Ok(row)
    }

    async fn delete_booking(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.bookings.remove(&id).is_some())
    }
}
