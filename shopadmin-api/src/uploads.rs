//! Local-disk storage for uploaded images
//!
//! The external file-storage collaborator behind the multipart endpoints:
//! it receives file bytes and returns stored path strings. Files land in a
//! configurable directory served statically at `/uploads/<filename>`.
//!
//! Filenames are randomized (UUID v4 plus the original extension) so
//! concurrent uploads cannot collide. Only image files are accepted and
//! each file is capped at 5 MB, matching the limits the admin UI expects.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Maximum accepted size for a single uploaded file
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Maximum number of images accepted per product
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// File extensions accepted for image uploads
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Error type for upload storage operations
#[derive(Debug, Error)]
pub enum UploadError {
    /// File exceeds [`MAX_FILE_SIZE`]
    #[error("File exceeds the 5 MB size limit")]
    TooLarge,

    /// Extension or content type is not an accepted image format
    #[error("Only image files are allowed (jpg, jpeg, png, gif)")]
    UnsupportedType,

    /// Filesystem failure while storing the file
    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
}

/// Local-disk upload store rooted at a single directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Creates an upload store, creating the root directory if needed
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, UploadError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// The directory files are stored in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores an uploaded file and returns its public path
    ///
    /// The returned string is the path clients use to fetch the file back
    /// (e.g. `/uploads/3fa85f64-....png`).
    ///
    /// # Errors
    ///
    /// - `UploadError::TooLarge` when the payload exceeds 5 MB
    /// - `UploadError::UnsupportedType` when the extension is not an image
    ///   format or the declared content type is not `image/*`
    /// - `UploadError::Io` when the write fails
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<String, UploadError> {
        if data.len() > MAX_FILE_SIZE {
            return Err(UploadError::TooLarge);
        }

        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or(UploadError::UnsupportedType)?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType);
        }

        if let Some(content_type) = content_type {
            if !content_type.starts_with("image/") {
                return Err(UploadError::UnsupportedType);
            }
        }

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::write(self.root.join(&file_name), &data).await?;

        tracing::debug!(file = %file_name, bytes = data.len(), "Stored uploaded image");

        Ok(format!("/uploads/{}", file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> UploadStore {
        let dir = std::env::temp_dir().join(format!("shopadmin-uploads-{}", Uuid::new_v4()));
        UploadStore::new(dir).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_returns_public_path() {
        let store = temp_store().await;

        let path = store
            .save("photo.PNG", Some("image/png"), Bytes::from_static(b"data"))
            .await
            .unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));

        let file_name = path.strip_prefix("/uploads/").unwrap();
        let stored = fs::read(store.root().join(file_name)).await.unwrap();
        assert_eq!(stored, b"data");
    }

    #[tokio::test]
    async fn test_same_file_gets_distinct_names() {
        let store = temp_store().await;

        let first = store
            .save("a.jpg", Some("image/jpeg"), Bytes::from_static(b"x"))
            .await
            .unwrap();
        let second = store
            .save("a.jpg", Some("image/jpeg"), Bytes::from_static(b"x"))
            .await
            .unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_rejects_non_image_extension() {
        let store = temp_store().await;

        let result = store
            .save("script.sh", Some("image/png"), Bytes::from_static(b"x"))
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));

        let result = store.save("noext", None, Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));
    }

    #[tokio::test]
    async fn test_rejects_non_image_content_type() {
        let store = temp_store().await;

        let result = store
            .save("fake.png", Some("text/html"), Bytes::from_static(b"x"))
            .await;
        assert!(matches!(result, Err(UploadError::UnsupportedType)));
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let store = temp_store().await;

        let data = Bytes::from(vec![0u8; MAX_FILE_SIZE + 1]);
        let result = store.save("big.png", Some("image/png"), data).await;
        assert!(matches!(result, Err(UploadError::TooLarge)));
    }
}
