pub mod bookings;
pub mod events;
pub mod venues;

pub use bookings::BookingService;
pub use events::{EventService, EventTypeService};
pub use venues::{ImageUpload, VenueService};

use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::AppError;
use crate::store::StoreError;

/// Local wall-clock time; booking dates are entered as local times.
pub(crate) fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Converts a store error, logging business rejections on the way.
pub(crate) fn rejected(action: &str, err: StoreError) -> AppError {
    if !matches!(err, StoreError::Database(_)) {
        warn!("{} rejected: {}", action, err);
    }
    AppError::from(err)
}
