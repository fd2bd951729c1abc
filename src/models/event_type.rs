use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::FormErrors;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EventType {
    pub event_type_id: i64,
    pub event_type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventType {
    pub event_type_name: String,
}

impl NewEventType {
    pub fn matches_identity(&self, other: &EventType) -> bool {
        normalize_name(&self.event_type_name) == normalize_name(&other.event_type_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventTypeForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Event Type Name is required and cannot exceed 100 characters."
    ))]
    pub event_type_name: String,
}

impl EventTypeForm {
    pub fn into_new_event_type(self) -> Result<NewEventType, FormErrors> {
        let form = EventTypeForm {
            event_type_name: self.event_type_name.trim().to_string(),
        };
        form.validate()?;
        Ok(NewEventType {
            event_type_name: form.event_type_name,
        })
    }
}

/// Comparison key for names that must be unique regardless of case and padding.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
