use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
    routing::get,
    Form, Json, Router,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::Antiforgery;
use crate::models::EventTypeForm;
use crate::services::EventTypeService;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/event-types", get(list_event_types).post(create_event_type))
}

// GET /event-types
pub async fn list_event_types(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let event_types = EventTypeService::new(&state).list().await?;
    Ok(Json(event_types))
}

// POST /event-types
pub async fn create_event_type(
    State(state): State<Arc<AppState>>,
    _token: Antiforgery,
    Form(form): Form<EventTypeForm>,
) -> Result<Redirect, AppError> {
    EventTypeService::new(&state).create(form).await?;
    Ok(Redirect::to("/event-types"))
}
