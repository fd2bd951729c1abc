use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;

use super::parse_id;
use crate::error::AppError;
use crate::middleware::Antiforgery;
use crate::models::{BookingFilter, BookingForm, BookingListQuery, BookingSearch, BookingSearchQuery};
use crate::services::BookingService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/search", get(search_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/edit", post(edit_booking))
        .route("/bookings/{id}/delete", post(delete_booking))
}

/* ---------- READ ---------- */

// GET /bookings?venue_id=&start_date=&end_date=
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = BookingFilter::try_from(params)?;
    let bookings = BookingService::new(&state).list(&filter).await?;
    Ok(Json(bookings))
}

// GET /bookings/search?q=&event_type_id=&venue_available=&date_from=&date_to=
pub async fn search_bookings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookingSearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let search = BookingSearch::try_from(params)?;
    let bookings = BookingService::new(&state).search(&search).await?;
    Ok(Json(bookings))
}

// GET /bookings/{id}
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Booking")?;
    let booking = BookingService::new(&state).get(id).await?;
    Ok(Json(booking))
}

/* ---------- WRITE ---------- */

// POST /bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    _token: Antiforgery,
    Form(form): Form<BookingForm>,
) -> Result<Redirect, AppError> {
    BookingService::new(&state).create(form).await?;
    Ok(Redirect::to("/bookings"))
}

// POST /bookings/{id}/edit
pub async fn edit_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
    Form(form): Form<BookingForm>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id, "Booking")?;
    BookingService::new(&state).update(id, form).await?;
    Ok(Redirect::to("/bookings"))
}

// POST /bookings/{id}/delete
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
) -> Result<Redirect, AppError> {
    // A malformed id names nothing, and deleting nothing still succeeds.
    if let Ok(id) = parse_id(&id, "Booking") {
        BookingService::new(&state).delete(id).await?;
    }
    Ok(Redirect::to("/bookings"))
}
