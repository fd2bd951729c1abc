use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::FormErrors;
use crate::forms;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: i64,
    pub event_id: i64,
    pub venue_id: i64,
    pub booking_date: NaiveDateTime,
}

/// A booking joined through its event (and event type) and its venue.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct BookingDetails {
    pub booking_id: i64,
    pub booking_date: NaiveDateTime,
    pub event_id: i64,
    pub event_name: String,
    pub event_date: NaiveDateTime,
    pub event_type_id: i64,
    pub event_type_name: String,
    pub venue_id: i64,
    pub venue_name: String,
    pub location: String,
    pub venue_availability: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewBooking {
    pub event_id: i64,
    pub venue_id: i64,
    pub booking_date: NaiveDateTime,
}

impl NewBooking {
    /// Holds the same venue at exactly the same instant.
    pub fn takes_slot_of(&self, other: &Booking) -> bool {
        self.venue_id == other.venue_id && self.booking_date == other.booking_date
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub venue_id: String,
    #[serde(default)]
    pub booking_date: String,
}

impl BookingForm {
    pub fn into_new_booking(self) -> Result<NewBooking, FormErrors> {
        let mut errors = FormErrors::new();
        let event_id = forms::required_id(&mut errors, "event_id", "Event", &self.event_id);
        let venue_id = forms::required_id(&mut errors, "venue_id", "Venue", &self.venue_id);
        let booking_date =
            forms::required_datetime(&mut errors, "booking_date", "Booking Date", &self.booking_date);

        match (event_id, venue_id, booking_date) {
            (Some(event_id), Some(venue_id), Some(booking_date)) => Ok(NewBooking {
                event_id,
                venue_id,
                booking_date,
            }),
            _ => Err(errors),
        }
    }
}

/// Filters of the booking list; every supplied bound must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingFilter {
    pub venue_id: Option<i64>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &BookingDetails) -> bool {
        self.venue_id.map_or(true, |v| booking.venue_id == v)
            && self.start_date.map_or(true, |d| booking.booking_date >= d)
            && self.end_date.map_or(true, |d| booking.booking_date <= d)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListQuery {
    pub venue_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<BookingListQuery> for BookingFilter {
    type Error = FormErrors;

    fn try_from(q: BookingListQuery) -> Result<Self, Self::Error> {
        let mut errors = FormErrors::new();
        let filter = BookingFilter {
            venue_id: forms::optional_id(&mut errors, "venue_id", q.venue_id.as_deref()),
            start_date: forms::optional_datetime(&mut errors, "start_date", q.start_date.as_deref()),
            end_date: forms::optional_datetime(&mut errors, "end_date", q.end_date.as_deref()),
        };
        errors.into_result(filter)
    }
}

/// Criteria of the read-only booking search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookingSearch {
    /// Matched against the booking id's digits and the event name.
    pub text: Option<String>,
    pub event_type_id: Option<i64>,
    pub venue_available: Option<bool>,
    /// Bounds on the event date, not the booking date.
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}

impl BookingSearch {
    pub fn matches(&self, booking: &BookingDetails) -> bool {
        let text_ok = self.text.as_deref().map_or(true, |text| {
            let needle = text.to_lowercase();
            booking.booking_id.to_string().contains(&needle)
                || booking.event_name.to_lowercase().contains(&needle)
        });

        text_ok
            && self.event_type_id.map_or(true, |t| booking.event_type_id == t)
            && self.venue_available.map_or(true, |a| booking.venue_availability == a)
            && self.date_from.map_or(true, |d| booking.event_date >= d)
            && self.date_to.map_or(true, |d| booking.event_date <= d)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingSearchQuery {
    pub q: Option<String>,
    pub event_type_id: Option<String>,
    pub venue_available: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl TryFrom<BookingSearchQuery> for BookingSearch {
    type Error = FormErrors;

    fn try_from(q: BookingSearchQuery) -> Result<Self, Self::Error> {
        let mut errors = FormErrors::new();
        let search = BookingSearch {
            text: forms::non_empty(q.q.as_deref()).map(str::to_string),
            event_type_id: forms::optional_id(&mut errors, "event_type_id", q.event_type_id.as_deref()),
            venue_available: forms::optional_bool(
                &mut errors,
                "venue_available",
                q.venue_available.as_deref(),
            ),
            date_from: forms::optional_datetime(&mut errors, "date_from", q.date_from.as_deref()),
            date_to: forms::optional_datetime(&mut errors, "date_to", q.date_to.as_deref()),
        };
        errors.into_result(search)
    }
}
