use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::FormErrors;
use crate::forms;
use crate::models::event_type::normalize_name;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub event_id: i64,
    pub event_name: String,
    pub event_date: NaiveDateTime,
    pub description: Option<String>,
    pub event_type_id: i64,
}

/// An event joined with its type, as listed and shown.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct EventDetails {
    pub event_id: i64,
    pub event_name: String,
    pub event_date: NaiveDateTime,
    pub description: Option<String>,
    pub event_type_id: i64,
    pub event_type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub event_name: String,
    pub event_date: NaiveDateTime,
    pub description: Option<String>,
    pub event_type_id: i64,
}

impl NewEvent {
    /// Same name (ignoring case and surrounding whitespace) on the same date-time.
    pub fn matches_identity(&self, other: &Event) -> bool {
        self.event_date == other.event_date
            && normalize_name(&self.event_name) == normalize_name(&other.event_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventForm {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 100,
        message = "Event Name is required and cannot exceed 100 characters."
    ))]
    pub event_name: String,

    #[serde(default)]
    pub event_date: String,

    #[serde(default)]
    #[validate(length(max = 200, message = "Description cannot exceed 200 characters."))]
    pub description: Option<String>,

    #[serde(default)]
    pub event_type_id: String,
}

impl EventForm {
    pub fn into_new_event(self) -> Result<NewEvent, FormErrors> {
        let form = EventForm {
            event_name: self.event_name.trim().to_string(),
            description: forms::non_empty(self.description.as_deref()).map(str::to_string),
            ..self
        };

        let mut errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        let event_date =
            forms::required_datetime(&mut errors, "event_date", "Event Date", &form.event_date);
        let event_type_id =
            forms::required_id(&mut errors, "event_type_id", "Event Type", &form.event_type_id);

        match (event_date, event_type_id) {
            (Some(event_date), Some(event_type_id)) if errors.is_empty() => Ok(NewEvent {
                event_name: form.event_name,
                event_date,
                description: form.description,
                event_type_id,
            }),
            _ => Err(errors),
        }
    }
}
