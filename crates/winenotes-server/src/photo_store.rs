use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

/// Extension used when the uploaded file name carries none we accept.
const FALLBACK_EXTENSION: &str = "jpg";

/// Photos on disk, one file per upload, named `<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    base_path: PathBuf,
    max_size: usize,
}

impl PhotoStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::PhotoStorage(format!(
                "Failed to create upload directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Photo store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Store a photo and return its generated file name.
    pub async fn store_photo(
        &self,
        extension: Option<&str>,
        data: &[u8],
    ) -> Result<String, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty photo".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::PhotoTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }

        let ext = extension
            .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or(FALLBACK_EXTENSION);
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.safe_path(&file_name)?;

        fs::write(&path, data).await.map_err(|e| {
            ServerError::PhotoStorage(format!("Failed to write photo {}: {}", file_name, e))
        })?;

        debug!(file = %file_name, size = data.len(), "Stored photo");
        Ok(file_name)
    }

    pub async fn get_photo(&self, file_name: &str) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_path(file_name)?;

        if !path.exists() {
            return Err(ServerError::NotFound("File"));
        }

        let data = fs::read(&path).await.map_err(|e| {
            ServerError::PhotoStorage(format!("Failed to read photo {}: {}", file_name, e))
        })?;

        debug!(file = %file_name, size = data.len(), "Retrieved photo");
        Ok(data)
    }

    pub async fn delete_photo(&self, file_name: &str) -> Result<(), ServerError> {
        let path = self.safe_path(file_name)?;

        if !path.exists() {
            return Err(ServerError::NotFound("File"));
        }

        fs::remove_file(&path).await.map_err(|e| {
            ServerError::PhotoStorage(format!("Failed to delete photo {}: {}", file_name, e))
        })?;

        debug!(file = %file_name, "Deleted photo");
        Ok(())
    }

    /// Resolve a bare file name inside the store, rejecting anything that
    /// could escape it.
    fn safe_path(&self, file_name: &str) -> Result<PathBuf, ServerError> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !file_name.contains('\\') => {
                Ok(self.base_path.join(file_name))
            }
            _ => Err(ServerError::BadRequest("Path traversal detected".to_string())),
        }
    }
}
