pub mod antiforgery;
pub mod bookings;
pub mod event_types;
pub mod events;
pub mod venues;

use axum::Router;
use std::sync::Arc;

use crate::error::AppError;

pub fn routes(state: &crate::AppState) -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(venues::routes(state.config.storage.max_image_bytes))
        .merge(event_types::routes())
        .merge(events::routes())
        .merge(bookings::routes())
        .merge(antiforgery::routes())
}

/// Path ids arrive as text; anything that is not a positive number names no row.
pub(crate) fn parse_id(raw: &str, what: &'static str) -> Result<i64, AppError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::NotFound(what)),
    }
}
