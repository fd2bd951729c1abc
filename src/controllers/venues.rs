use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use super::parse_id;
use crate::error::{AppError, FormErrors};
use crate::forms;
use crate::middleware::Antiforgery;
use crate::models::VenueForm;
use crate::services::{ImageUpload, VenueService};
use crate::AppState;

// Room for the text fields and multipart framing around the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn routes(max_image_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues).post(create_venue))
        .route("/venues/{id}", get(get_venue))
        .route("/venues/{id}/edit", post(edit_venue))
        .route("/venues/{id}/delete", post(delete_venue))
        .layer(DefaultBodyLimit::max(max_image_bytes + FORM_OVERHEAD_BYTES))
}

/// Everything a venue form submits.
#[derive(Debug, Default)]
struct VenueSubmission {
    form: VenueForm,
    image: Option<ImageUpload>,
    delete_image: bool,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::Validation(FormErrors::single(
            Some("image_file"),
            "The image is too large.",
        ));
    }
    tracing::warn!("Malformed venue form: {}", e.body_text());
    AppError::BadRequest(e.body_text())
}

async fn read_submission(mut multipart: Multipart) -> Result<VenueSubmission, AppError> {
    let mut submission = VenueSubmission::default();
    let mut errors = FormErrors::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                submission.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {
                let value = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "venue_name" => submission.form.venue_name = value,
                    "location" => submission.form.location = value,
                    "capacity" => submission.form.capacity = value,
                    // Unchecked boxes are not submitted at all; a box paired with a
                    // hidden "false" input arrives twice and any "true" wins.
                    "availability" => {
                        submission.form.availability |=
                            forms::optional_bool(&mut errors, "availability", Some(value.as_str()))
                                .unwrap_or(false)
                    }
                    "delete_image" => {
                        submission.delete_image |=
                            forms::optional_bool(&mut errors, "delete_image", Some(value.as_str()))
                                .unwrap_or(false)
                    }
                    _ => tracing::debug!("Ignoring venue form field {:?}", name),
                }
            }
        }
    }

    Ok(errors.into_result(submission)?)
}

// GET /venues
pub async fn list_venues(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let venues = VenueService::new(&state).list().await?;
    Ok(Json(venues))
}

// GET /venues/{id}
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Venue")?;
    let venue = VenueService::new(&state).get(id).await?;
    Ok(Json(venue))
}

// POST /venues
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    _token: Antiforgery,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let submission = read_submission(multipart).await?;
    VenueService::new(&state)
        .create(submission.form, submission.image)
        .await?;
    Ok(Redirect::to("/venues"))
}

// POST /venues/{id}/edit
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id, "Venue")?;
    let submission = read_submission(multipart).await?;
    VenueService::new(&state)
        .update(id, submission.form, submission.image, submission.delete_image)
        .await?;
    Ok(Redirect::to("/venues"))
}

// POST /venues/{id}/delete
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    _token: Antiforgery,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id, "Venue")?;
    VenueService::new(&state).delete(id).await?;
    Ok(Redirect::to("/venues"))
}
