use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{error::ErrorKind, postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::{Conflict, DeleteBlocked, MissingReference, Store, StoreError, StoreResult};
use crate::models::{
    Booking, BookingDetails, BookingFilter, BookingSearch, Event, EventDetails, EventType,
    NewBooking, NewEvent, NewEventType, NewVenue, Venue,
};

const VENUE_COLUMNS: &str = "venue_id, venue_name, location, capacity, availability, image_url";
const EVENT_COLUMNS: &str = "event_id, event_name, event_date, description, event_type_id";
const BOOKING_COLUMNS: &str = "booking_id, event_id, venue_id, booking_date";

const EVENT_DETAILS_SELECT: &str = r#"
    SELECT e.event_id, e.event_name, e.event_date, e.description,
           e.event_type_id, t.event_type_name
    FROM events e
    JOIN event_types t ON t.event_type_id = e.event_type_id
"#;

const BOOKING_DETAILS_SELECT: &str = r#"
    SELECT b.booking_id, b.booking_date,
           e.event_id, e.event_name, e.event_date,
           t.event_type_id, t.event_type_name,
           v.venue_id, v.venue_name, v.location, v.availability AS venue_availability
    FROM bookings b
    JOIN events e ON e.event_id = b.event_id
    JOIN event_types t ON t.event_type_id = e.event_type_id
    JOIN venues v ON v.venue_id = b.venue_id
"#;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pub pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }
}

// Unique indexes and foreign keys are named in the migrations; map them back
// to the business rule they enforce.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                let conflict = match constraint {
                    "ux_venues_name_location" => Some(Conflict::DuplicateVenue),
                    "ux_events_name_date" => Some(Conflict::DuplicateEvent),
                    "ux_event_types_name" => Some(Conflict::DuplicateEventType),
                    "ux_bookings_venue_date" => Some(Conflict::VenueSlotTaken),
                    _ => None,
                };
                if let Some(conflict) = conflict {
                    return StoreError::Conflict(conflict);
                }
            }
            ErrorKind::ForeignKeyViolation => {
                let reference = match constraint {
                    "fk_bookings_event" => Some(MissingReference::Event),
                    "fk_bookings_venue" => Some(MissingReference::Venue),
                    "fk_events_event_type" => Some(MissingReference::EventType),
                    _ => None,
                };
                if let Some(reference) = reference {
                    return StoreError::MissingReference(reference);
                }
            }
            _ => {}
        }
    }
    StoreError::Database(err)
}

/// Escapes `%`, `_` and `\` so user text is matched literally by LIKE.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Locks every booking of the venue or event and reports whether any is still
/// ahead of `now`.
///
/// All rows are locked, past ones included. An update that moves a past booking
/// into the future leaves the parent key alone and so never waits on the parent
/// row lock; here it is waited on and its committed date is read.
async fn has_future_booking(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent: &'static str,
    id: i64,
    now: NaiveDateTime,
) -> StoreResult<bool> {
    let dates = sqlx::query_scalar::<_, NaiveDateTime>(&format!(
        "SELECT booking_date FROM bookings WHERE {parent} = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_all(&mut **tx)
    .await?;
    Ok(dates.iter().any(|date| *date > now))
}

#[async_trait]
impl Store for PgStore {
    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        let venues = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues ORDER BY venue_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(venues)
    }

    async fn find_venue(&self, id: i64) -> StoreResult<Option<Venue>> {
        let venue = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE venue_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(venue)
    }

    async fn insert_venue(&self, venue: &NewVenue) -> StoreResult<Venue> {
        sqlx::query_as::<_, Venue>(&format!(
            "INSERT INTO venues (venue_name, location, capacity, availability, image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VENUE_COLUMNS}"
        ))
        .bind(&venue.venue_name)
        .bind(&venue.location)
        .bind(venue.capacity)
        .bind(venue.availability)
        .bind(&venue.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update_venue(&self, id: i64, venue: &NewVenue) -> StoreResult<Venue> {
        sqlx::query_as::<_, Venue>(&format!(
            "UPDATE venues
             SET venue_name = $2, location = $3, capacity = $4, availability = $5, image_url = $6
             WHERE venue_id = $1
             RETURNING {VENUE_COLUMNS}"
        ))
        .bind(id)
        .bind(&venue.venue_name)
        .bind(&venue.location)
        .bind(venue.capacity)
        .bind(venue.availability)
        .bind(&venue.image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::NotFound("Venue"))
    }

    async fn delete_venue(&self, id: i64, now: NaiveDateTime) -> StoreResult<Venue> {
        let mut tx = self.pool.begin().await?;

        // The row lock keeps new bookings (their FK check needs a key-share
        // lock on this row) out until the transaction ends.
        let venue = sqlx::query_as::<_, Venue>(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues WHERE venue_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Venue"))?;

        if has_future_booking(&mut tx, "venue_id", id, now).await? {
            return Err(StoreError::DeleteBlocked(DeleteBlocked::Venue));
        }

        sqlx::query("DELETE FROM venues WHERE venue_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(venue)
    }

    async fn list_event_types(&self) -> StoreResult<Vec<EventType>> {
        let types = sqlx::query_as::<_, EventType>(
            "SELECT event_type_id, event_type_name FROM event_types ORDER BY event_type_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(types)
    }

    async fn insert_event_type(&self, event_type: &NewEventType) -> StoreResult<EventType> {
        sqlx::query_as::<_, EventType>(
            "INSERT INTO event_types (event_type_name) VALUES ($1)
             RETURNING event_type_id, event_type_name",
        )
        .bind(&event_type.event_type_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn list_events(&self) -> StoreResult<Vec<EventDetails>> {
        let events = sqlx::query_as::<_, EventDetails>(&format!(
            "{EVENT_DETAILS_SELECT} ORDER BY e.event_date, e.event_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn find_event(&self, id: i64) -> StoreResult<Option<EventDetails>> {
        let event = sqlx::query_as::<_, EventDetails>(&format!(
            "{EVENT_DETAILS_SELECT} WHERE e.event_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn insert_event(&self, event: &NewEvent) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (event_name, event_date, description, event_type_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&event.event_name)
        .bind(event.event_date)
        .bind(&event.description)
        .bind(event.event_type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update_event(&self, id: i64, event: &NewEvent) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events
             SET event_name = $2, event_date = $3, description = $4, event_type_id = $5
             WHERE event_id = $1
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .bind(&event.event_name)
        .bind(event.event_date)
        .bind(&event.description)
        .bind(event.event_type_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::NotFound("Event"))
    }

    async fn delete_event(&self, id: i64, now: NaiveDateTime) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound("Event"))?;

        if has_future_booking(&mut tx, "event_id", id, now).await? {
            return Err(StoreError::DeleteBlocked(DeleteBlocked::Event));
        }

        sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(event)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> StoreResult<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(&format!(
            "{BOOKING_DETAILS_SELECT}
             WHERE ($1::BIGINT IS NULL OR b.venue_id = $1)
               AND ($2::TIMESTAMP IS NULL OR b.booking_date >= $2)
               AND ($3::TIMESTAMP IS NULL OR b.booking_date <= $3)
             ORDER BY b.booking_date, b.booking_id"
        ))
        .bind(filter.venue_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn search_bookings(&self, search: &BookingSearch) -> StoreResult<Vec<BookingDetails>> {
        let mut q = format!("{BOOKING_DETAILS_SELECT} WHERE TRUE");
        let mut bind_idx = 1;
        if search.text.is_some() {
            q.push_str(&format!(
                " AND (b.booking_id::TEXT LIKE ${bind_idx} OR e.event_name ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if search.event_type_id.is_some() {
            q.push_str(&format!(" AND e.event_type_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if search.venue_available.is_some() {
            q.push_str(&format!(" AND v.availability = ${bind_idx}"));
            bind_idx += 1;
        }
        if search.date_from.is_some() {
            q.push_str(&format!(" AND e.event_date >= ${bind_idx}"));
            bind_idx += 1;
        }
        if search.date_to.is_some() {
            q.push_str(&format!(" AND e.event_date <= ${bind_idx}"));
        }
        q.push_str(" ORDER BY b.booking_date, b.booking_id");

        let mut dbq = sqlx::query_as::<_, BookingDetails>(&q);
        if let Some(text) = &search.text {
            dbq = dbq.bind(format!("%{}%", escape_like(text)));
        }
        if let Some(t) = search.event_type_id {
            dbq = dbq.bind(t);
        }
        if let Some(a) = search.venue_available {
            dbq = dbq.bind(a);
        }
        if let Some(d) = search.date_from {
            dbq = dbq.bind(d);
        }
        if let Some(d) = search.date_to {
            dbq = dbq.bind(d);
        }

        let bookings = dbq.fetch_all(&self.pool).await?;
        Ok(bookings)
    }

    async fn find_booking(&self, id: i64) -> StoreResult<Option<BookingDetails>> {
        let booking = sqlx::query_as::<_, BookingDetails>(&format!(
            "{BOOKING_DETAILS_SELECT} WHERE b.booking_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(booking)
    }

    async fn insert_booking(&self, booking: &NewBooking) -> StoreResult<Booking> {
        sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (event_id, venue_id, booking_date)
             VALUES ($1, $2, $3)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking.event_id)
        .bind(booking.venue_id)
        .bind(booking.booking_date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn update_booking(&self, id: i64, booking: &NewBooking) -> StoreResult<Booking> {
        sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET event_id = $2, venue_id = $3, booking_date = $4
             WHERE booking_id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(booking.event_id)
        .bind(booking.venue_id)
        .bind(booking.booking_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(StoreError::NotFound("Booking"))
    }

    async fn delete_booking(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
