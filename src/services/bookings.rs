//! Booking management.
//!
//! A venue can hold one booking per instant; the store enforces that, so this
//! service only validates input and reports what the store refused.

use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{Booking, BookingDetails, BookingFilter, BookingForm, BookingSearch};
use crate::AppState;

use super::rejected;

pub struct BookingService<'a> {
    state: &'a AppState,
}

impl<'a> BookingService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<BookingDetails>, AppError> {
        let bookings = self.state.store.list_bookings(filter).await?;
        debug!("Listed {} bookings for {:?}", bookings.len(), filter);
        Ok(bookings)
    }

    pub async fn search(&self, search: &BookingSearch) -> Result<Vec<BookingDetails>, AppError> {
        let bookings = self.state.store.search_bookings(search).await?;
        debug!("Search {:?} matched {} bookings", search, bookings.len());
        Ok(bookings)
    }

    pub async fn get(&self, id: i64) -> Result<BookingDetails, AppError> {
        self.state
            .store
            .find_booking(id)
            .await?
            .ok_or(AppError::NotFound("Booking"))
    }

    pub async fn create(&self, form: BookingForm) -> Result<Booking, AppError> {
        let booking = form.into_new_booking()?;
        let created = self
            .state
            .store
            .insert_booking(&booking)
            .await
            .map_err(|e| rejected("create_booking", e))?;

        info!(
            "Booking {} created: event {} at venue {} on {}",
            created.booking_id, created.event_id, created.venue_id, created.booking_date
        );
        Ok(created)
    }

    pub async fn update(&self, id: i64, form: BookingForm) -> Result<Booking, AppError> {
        // Missing bookings are reported before the form is judged.
        self.get(id).await?;

        let booking = form.into_new_booking()?;
        let updated = self
            .state
            .store
            .update_booking(id, &booking)
            .await
            .map_err(|e| rejected("update_booking", e))?;

        info!("Booking {} updated", id);
        Ok(updated)
    }

    /// Deleting a booking that is already gone is not an error.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.state.store.delete_booking(id).await? {
            info!("Booking {} deleted", id);
        } else {
            debug!("Booking {} was already gone", id);
        }
        Ok(())
    }
}
