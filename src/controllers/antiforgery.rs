use axum::{
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::middleware::issue_token;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/antiforgery", get(antiforgery_token))
}

// GET /antiforgery
pub async fn antiforgery_token() -> impl IntoResponse {
    let (token, cookie) = issue_token();
    ([(header::SET_COOKIE, cookie)], Json(json!({ "token": token })))
}
