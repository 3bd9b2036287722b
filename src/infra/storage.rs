//! Attachment blob storage.
//!
//! Blobs are addressed by relative path `<ticket_code>/<filename>`. The
//! database keeps that path; duplicating a ticket copies the path, not the
//! blob, so duplicates share the original bytes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Build the storage path for an uploaded file.
///
/// Filenames are flattened to their final component and prefixed with a
/// short random tag so two uploads with the same name never collide.
pub fn blob_path(ticket_code: &str, filename: &str) -> String {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let tag = Uuid::new_v4().simple().to_string();
    format!("{}/{}_{}", ticket_code, &tag[..8], name)
}

/// Blob store trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store a blob under the given relative path.
    async fn put(&self, relative_path: &str, data: &[u8]) -> AppResult<()>;

    /// Read a blob back by its relative path.
    async fn get(&self, relative_path: &str) -> AppResult<Vec<u8>>;
}

/// Filesystem-backed blob store rooted at a configurable directory.
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative_path: &str) -> AppResult<PathBuf> {
        // Reject traversal segments; stored paths are always
        // `<ticket_code>/<filename>`.
        if Path::new(relative_path)
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return Err(AppError::BadRequest("Invalid attachment path".into()));
        }
        Ok(self.root.join(relative_path))
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn put(&self, relative_path: &str, data: &[u8]) -> AppResult<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::internal(format!("Blob write failed: {}", e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::internal(format!("Blob write failed: {}", e)))?;
        Ok(())
    }

    async fn get(&self, relative_path: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
            Err(e) => Err(AppError::internal(format!("Blob read failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_paths_are_scoped_to_the_ticket() {
        let path = blob_path("TCK3F9A01BC", "report.pdf");
        assert!(path.starts_with("TCK3F9A01BC/"));
        assert!(path.ends_with("_report.pdf"));
    }

    #[test]
    fn blob_paths_flatten_directory_components() {
        let path = blob_path("TCK3F9A01BC", "../../etc/passwd");
        assert!(path.starts_with("TCK3F9A01BC/"));
        assert!(!path.contains(".."));
    }

    #[tokio::test]
    async fn roundtrip_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());

        store.put("TCKAAAA0001/x_file.png", b"bytes").await.unwrap();
        let data = store.get("TCKAAAA0001/x_file.png").await.unwrap();
        assert_eq!(data, b"bytes");
    }

    #[tokio::test]
    async fn missing_blob_maps_to_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());

        let err = store.get("TCKAAAA0001/missing.pdf").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAttachmentStore::new(dir.path());

        let err = store.get("../secret").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
