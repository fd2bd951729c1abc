use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::FormErrors;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub venue_id: i64,
    pub venue_name: String,
    pub location: String,
    pub capacity: i32,
    pub availability: bool,
    pub image_url: Option<String>,
}

/// Venue columns as written by create and edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVenue {
    pub venue_name: String,
    pub location: String,
    pub capacity: i32,
    pub availability: bool,
    pub image_url: Option<String>,
}

impl NewVenue {
    pub fn matches_identity(&self, other: &Venue) -> bool {
        self.venue_name.to_lowercase() == other.venue_name.to_lowercase()
            && self.location.to_lowercase() == other.location.to_lowercase()
    }
}

/// Text fields of the venue form; the image travels separately.
#[derive(Debug, Clone, Default, Validate)]
pub struct VenueForm {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Venue Name is required and cannot exceed 100 characters."
    ))]
    pub venue_name: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Location is required and cannot exceed 200 characters."
    ))]
    pub location: String,

    pub capacity: String,

    pub availability: bool,
}

impl VenueForm {
    /// Validates the form and produces the row to write, keeping `image_url`.
    pub fn into_new_venue(self, image_url: Option<String>) -> Result<NewVenue, FormErrors> {
        let form = VenueForm {
            venue_name: self.venue_name.trim().to_string(),
            location: self.location.trim().to_string(),
            ..self
        };
        let mut errors = match form.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let capacity = match form.capacity.trim().parse::<i32>() {
            Ok(c) if c >= 1 => c,
            Ok(_) => {
                errors.push(Some("capacity"), "Capacity must be at least 1.");
                0
            }
            Err(_) if form.capacity.trim().is_empty() => {
                errors.push(Some("capacity"), "Capacity is required.");
                0
            }
            Err(_) => {
                errors.push(Some("capacity"), "Capacity must be a whole number.");
                0
            }
        };

        errors.into_result(NewVenue {
            venue_name: form.venue_name,
            location: form.location,
            capacity,
            availability: form.availability,
            image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, location: &str, capacity: &str) -> VenueForm {
        VenueForm {
            venue_name: name.to_string(),
            location: location.to_string(),
            capacity: capacity.to_string(),
            availability: true,
        }
    }

    #[test]
    fn valid_form_becomes_row() {
        let venue = form(" Hall A ", "Cape Town", "250")
            .into_new_venue(Some("http://img/x.png".into()))
            .unwrap();
        assert_eq!(venue.venue_name, "Hall A");
        assert_eq!(venue.capacity, 250);
        assert_eq!(venue.image_url.as_deref(), Some("http://img/x.png"));
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = form("", &"x".repeat(201), "zero").into_new_venue(None).unwrap_err();
        assert!(errors.has_field("venue_name"));
        assert!(errors.has_field("location"));
        assert!(errors.has_field("capacity"));
    }

    #[test]
    fn capacity_must_be_positive() {
        let errors = form("Hall", "Durban", "0").into_new_venue(None).unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(errors.errors[0].message, "Capacity must be at least 1.");
    }

    #[test]
    fn identity_ignores_case() {
        let existing = Venue {
            venue_id: 1,
            venue_name: "Grand Hall".into(),
            location: "Johannesburg".into(),
            capacity: 10,
            availability: true,
            image_url: None,
        };
        let candidate = form("GRAND hall", "johannesburg", "5").into_new_venue(None).unwrap();
        assert!(candidate.matches_identity(&existing));
    }
}
