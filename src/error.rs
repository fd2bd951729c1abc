//! HTTP-facing error type.
//!
//! Every handler returns `Result<_, AppError>`. Business failures carry the
//! form errors that a client would show next to its inputs; infrastructure
//! failures are logged here and reach the client only as a generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blob_store::BlobError;
use crate::store::StoreError;

/// One message attached to a form field, or to the whole form when `field` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

/// Accumulated validation messages for one submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: Option<&str>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn extend(&mut self, other: FormErrors) {
        self.errors.extend(other.errors);
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field.as_deref() == Some(field))
    }
}

impl From<validator::ValidationErrors> for FormErrors {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut out = FormErrors::new();
        let mut fields: Vec<_> = errs.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, list) in fields {
            for e in list {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid."));
                out.push(Some(field.as_ref()), message);
            }
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation(FormErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("anti-forgery token missing or invalid")]
    Antiforgery,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("image storage error: {0}")]
    Storage(#[from] BlobError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found"), Vec::new()),
            AppError::Validation(form) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "The submitted form is invalid.".to_string(),
                form.errors,
            ),
            AppError::Conflict(message) => {
                let errors = vec![FieldError {
                    field: None,
                    message: message.clone(),
                }];
                (StatusCode::CONFLICT, message, errors)
            }
            AppError::Antiforgery => (
                StatusCode::BAD_REQUEST,
                "Anti-forgery token missing or invalid.".to_string(),
                Vec::new(),
            ),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, Vec::new()),
            AppError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Vec::new())
            }
            AppError::Storage(e) => {
                tracing::error!("image storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Vec::new())
            }
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

impl From<FormErrors> for AppError {
    fn from(errors: FormErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Conflict(conflict) => AppError::Conflict(conflict.message().to_string()),
            StoreError::DeleteBlocked(what) => AppError::Conflict(what.message().to_string()),
            StoreError::MissingReference(reference) => AppError::Validation(FormErrors::single(
                Some(reference.field()),
                reference.message(),
            )),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}
