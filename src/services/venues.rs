//! venues.rs
//!
//! Venue lifecycle including the photo kept in the blob store.
//!
//! Ordering rules for the photo:
//! - a new upload is written before the row; if the row write fails the
//!   upload is removed again;
//! - a replaced or cleared photo is removed only after the row write succeeded.

use tracing::{error, info, warn};

use crate::error::{AppError, FormErrors};
use crate::models::{Venue, VenueForm};
use crate::AppState;

use super::{now, rejected};

const IMAGE_FIELD: &str = "image_file";

/// Image types accepted for venue photos and the extension each is stored under.
/// Anything else (SVG included) could be served as active content.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/pjpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Storage extension for a declared content type, ignoring parameters and case.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// A file received with the venue form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Browsers send an empty part when no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub struct VenueService<'a> {
    state: &'a AppState,
}

impl<'a> VenueService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self) -> Result<Vec<Venue>, AppError> {
        Ok(self.state.store.list_venues().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Venue, AppError> {
        self.state
            .store
            .find_venue(id)
            .await?
            .ok_or(AppError::NotFound("Venue"))
    }

    pub async fn create(
        &self,
        form: VenueForm,
        image: Option<ImageUpload>,
    ) -> Result<Venue, AppError> {
        let mut venue = form.into_new_venue(None)?;
        let image = match image.filter(|i| !i.is_empty()) {
            Some(image) => Some((self.check_image(&image)?, image)),
            None => None,
        };

        if let Some((extension, image)) = &image {
            venue.image_url = Some(self.store_image(extension, image).await?);
        }

        match self.state.store.insert_venue(&venue).await {
            Ok(created) => {
                info!("Venue {} created: {}", created.venue_id, created.venue_name);
                Ok(created)
            }
            Err(e) => {
                if let Some(url) = &venue.image_url {
                    self.discard_image(url).await;
                }
                Err(rejected("create_venue", e))
            }
        }
    }

    pub async fn update(
        &self,
        id: i64,
        form: VenueForm,
        image: Option<ImageUpload>,
        delete_image: bool,
    ) -> Result<Venue, AppError> {
        let existing = self.get(id).await?;

        let mut venue = form.into_new_venue(existing.image_url.clone())?;
        let image = match image.filter(|i| !i.is_empty()) {
            Some(image) => Some((self.check_image(&image)?, image)),
            None => None,
        };

        if delete_image {
            venue.image_url = None;
        }
        let uploaded = match &image {
            Some((extension, image)) => Some(self.store_image(extension, image).await?),
            None => None,
        };
        if uploaded.is_some() {
            venue.image_url = uploaded.clone();
        }

        let updated = match self.state.store.update_venue(id, &venue).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(url) = &uploaded {
                    self.discard_image(url).await;
                }
                return Err(rejected("update_venue", e));
            }
        };

        if let Some(old) = &existing.image_url {
            if updated.image_url.as_ref() != Some(old) {
                self.discard_image(old).await;
            }
        }

        info!("Venue {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<Venue, AppError> {
        let deleted = self
            .state
            .store
            .delete_venue(id, now())
            .await
            .map_err(|e| rejected("delete_venue", e))?;

        if let Some(url) = &deleted.image_url {
            self.discard_image(url).await;
        }

        info!("Venue {} deleted", id);
        Ok(deleted)
    }

    /// Accepts the upload and returns the extension it will be stored under.
    fn check_image(&self, image: &ImageUpload) -> Result<&'static str, FormErrors> {
        let Some(extension) = image_extension(&image.content_type) else {
            warn!(
                "Rejected upload {:?} with content type {:?}",
                image.file_name, image.content_type
            );
            return Err(FormErrors::single(
                Some(IMAGE_FIELD),
                "Please upload a valid image file.",
            ));
        };

        let max = self.state.config.storage.max_image_bytes;
        if image.bytes.len() > max {
            return Err(FormErrors::single(
                Some(IMAGE_FIELD),
                format!("The image cannot exceed {} bytes.", max),
            ));
        }
        Ok(extension)
    }

    async fn store_image(&self, extension: &str, image: &ImageUpload) -> Result<String, AppError> {
        Ok(self.state.images.upload(extension, &image.bytes).await?)
    }

    // The venue row is already consistent at this point, so a leftover blob is
    // only logged.
    async fn discard_image(&self, url: &str) {
        if let Err(e) = self.state.images.delete(url).await {
            error!("Failed to delete image {}: {:?}", url, e);
        }
    }
}
