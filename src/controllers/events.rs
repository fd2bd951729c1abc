use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use std::sync::Arc;

use super::parse_id;
use crate::error::AppError;
use crate::middleware::Antiforgery;
use crate::models::EventForm;
use crate::services::EventService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/edit", post(edit_event))
        .route("/events/{id}/delete", post(delete_event))
}

// GET /events
pub async fn list_events(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let events = EventService::new(&state).list().await?;
    Ok(Json(events))
}

// GET /events/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Event")?;
    let event = EventService::new(&state).get(id).await?;
    Ok(Json(event))
}

// POST /events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _token: Antiforgery,
    Form(form): Form<EventForm>,
) -> Result<Redirect, AppError> {
    EventService::new(&state).create(form).await?;
    Ok(Redirect::to("/events"))
}

// POST /events/{id}/edit
pub async fn edit_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
    Form(form): Form<EventForm>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id, "Event")?;
    EventService::new(&state).update(id, form).await?;
    Ok(Redirect::to("/events"))
}

// POST /events/{id}/delete
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id, "Event")?;
    EventService::new(&state).delete(id).await?;
    Ok(Redirect::to("/events"))
}
