//! Venue photo storage.
//!
//! Blobs are addressed by the public URL returned from `upload`; deleting is
//! idempotent so a venue can always be cleaned up, even after a partial failure.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("address {0:?} does not name a blob in this store")]
    InvalidAddress(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under a fresh name ending in `extension` and returns
    /// the public address. The extension decides how the blob is served, so
    /// callers derive it from a checked content type, never from client input.
    async fn upload(&self, extension: &str, bytes: &[u8]) -> Result<String, BlobError>;

    /// Removes the blob behind `address`; a missing blob is not an error.
    async fn delete(&self, address: &str) -> Result<(), BlobError>;
}

/// Blob container on the local filesystem, served under `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a public address back to the file it names, refusing anything
    /// that would step outside the container.
    fn blob_path(&self, address: &str) -> Result<PathBuf, BlobError> {
        let without_query = address.split(['?', '#']).next().unwrap_or_default();
        let name = without_query.rsplit('/').next().unwrap_or_default();

        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains('\\')
            && !name.starts_with('.');
        if !valid {
            return Err(BlobError::InvalidAddress(address.to_string()));
        }
        Ok(self.root.join(name))
    }
}

/// Fresh blob name such as `<uuid>.png`.
fn blob_name(extension: &str) -> String {
    let ext = Some(extension.trim_start_matches('.'))
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), ext)
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, extension: &str, bytes: &[u8]) -> Result<String, BlobError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let name = blob_name(extension);
        tokio::fs::write(self.root.join(&name), bytes).await?;

        let address = format!("{}/{}", self.public_base_url, name);
        info!("Stored image {} ({} bytes)", address, bytes.len());
        Ok(address)
    }

    async fn delete(&self, address: &str) -> Result<(), BlobError> {
        let path = self.blob_path(address)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted image {}", address);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Image {} already absent", address);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
