//! Blob storage for uploaded images.
//!
//! Blobs are written to the configured upload directory under a generated
//! name and addressed by that name from then on. A message may only link a
//! reference that already exists, so the write always happens first.

use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Upload exceeds the maximum size of {0} bytes")]
    TooLarge(usize),

    #[error("Upload is empty")]
    Empty,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge(_) | UploadError::Empty => ApiError::Validation(err.to_string()),
            UploadError::Io(e) => ApiError::Internal(format!("Upload storage error: {}", e)),
        }
    }
}

/// Filesystem-backed blob store.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    max_size_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_size_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_size_bytes,
        }
    }

    /// Store a blob and return its durable reference.
    pub async fn store(&self, data: &[u8]) -> Result<String, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > self.max_size_bytes {
            return Err(UploadError::TooLarge(self.max_size_bytes));
        }

        fs::create_dir_all(&self.dir).await?;

        let reference = Uuid::new_v4().to_string();
        fs::write(self.path_for(&reference), data).await?;

        Ok(reference)
    }

    /// True iff a blob with this reference has been stored. References are
    /// generated names; anything with a path separator is rejected outright.
    pub async fn exists(&self, reference: &str) -> bool {
        if reference.is_empty() || !reference.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return false;
        }
        fs::try_exists(self.path_for(reference)).await.unwrap_or(false)
    }

    /// Read a stored blob back.
    pub async fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, UploadError> {
        if !self.exists(reference).await {
            return Ok(None);
        }
        Ok(Some(fs::read(self.path_for(reference)).await?))
    }

    fn path_for(&self, reference: &str) -> PathBuf {
        self.dir.join(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UploadStore {
        let dir = std::env::temp_dir().join(format!("fh-uploads-{}", Uuid::new_v4()));
        UploadStore::new(dir, 1024)
    }

    #[tokio::test]
    async fn store_then_link_round_trip() {
        let store = store();

        let reference = store.store(b"image bytes").await.unwrap();
        assert!(store.exists(&reference).await);
        assert_eq!(store.read(&reference).await.unwrap().unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn unknown_reference_does_not_exist() {
        let store = store();
        assert!(!store.exists(&Uuid::new_v4().to_string()).await);
    }

    #[tokio::test]
    async fn traversal_references_rejected() {
        let store = store();
        assert!(!store.exists("../etc/passwd").await);
        assert!(!store.exists("").await);
    }

    #[tokio::test]
    async fn size_limit_enforced() {
        let store = store();
        let too_big = vec![0u8; 2048];
        assert!(matches!(
            store.store(&too_big).await.unwrap_err(),
            UploadError::TooLarge(_)
        ));
        assert!(matches!(store.store(b"").await.unwrap_err(), UploadError::Empty));
    }
}
