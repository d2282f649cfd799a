//! Upload staging
//!
//! Incoming multipart file parts are written to a local staging directory and handed to
//! the lifecycle workflows as an [`UploadBatch`]. Any rejection drops the files already
//! staged for the request.

use crate::config::schema::StagingConfig;
use crate::domain::{
    FolioError, ResourceKind, Result, SlotName, StagedUpload, UploadBatch,
};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One file part of a request
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Multipart field name (`image`, `coverImage`, `pdf`, `images`)
    pub field_name: String,
    /// File name as sent by the client
    pub file_name: String,
    /// File content
    pub bytes: Vec<u8>,
    /// Remote id of the gallery item this file replaces
    pub replaces: Option<String>,
}

impl IncomingFile {
    /// File part without a replacement target
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            bytes: bytes.into(),
            replaces: None,
        }
    }

    /// Mark the part as replacing an existing gallery item
    pub fn replacing(mut self, remote_id: impl Into<String>) -> Self {
        self.replaces = Some(remote_id.into());
        self
    }
}

/// Writes request files to a local directory
#[derive(Debug, Clone)]
pub struct LocalUploadStager {
    directory: PathBuf,
    max_file_size_bytes: u64,
}

impl LocalUploadStager {
    /// Create a stager from configuration
    pub fn new(config: &StagingConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }

    /// Staging directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Stage the file parts of one request for a resource kind
    ///
    /// # Errors
    ///
    /// Returns a validation error for an undeclared field, a field over its item count,
    /// a disallowed extension or an oversized file.
    pub async fn stage(&self, kind: ResourceKind, files: Vec<IncomingFile>) -> Result<UploadBatch> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let mut batch = UploadBatch::empty();
        for file in files {
            let slot: SlotName = file.field_name.parse().map_err(FolioError::Validation)?;
            let spec = kind.slot_spec(slot).ok_or_else(|| {
                FolioError::Validation(format!("Unexpected field: {}", file.field_name))
            })?;

            if batch.count_for(slot) >= spec.max_items {
                return Err(FolioError::Validation(format!(
                    "Unexpected field: {}",
                    file.field_name
                )));
            }
            if !spec.file_class.accepts(&file.file_name) {
                return Err(FolioError::Validation("Invalid file type".to_string()));
            }
            if file.bytes.len() as u64 > self.max_file_size_bytes {
                return Err(FolioError::Validation("File size is too large".to_string()));
            }

            let path = self.directory.join(staged_name(&file.file_name));
            tokio::fs::write(&path, &file.bytes).await?;

            let mut upload = StagedUpload::new(slot, path);
            if let Some(remote_id) = file.replaces {
                upload = upload.replacing(remote_id);
            }
            tracing::debug!(slot = %slot, path = %upload.file.path().display(), "Staged upload");
            batch.push(upload);
        }

        Ok(batch)
    }
}

fn staged_name(original: &str) -> String {
    let extension = Path::new(original)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    format!("{}{}", Uuid::new_v4(), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stager(dir: &TempDir, max: u64) -> LocalUploadStager {
        LocalUploadStager::new(&StagingConfig {
            directory: dir.path().display().to_string(),
            max_file_size_bytes: max,
        })
    }

    fn staged_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_stages_declared_slots() {
        let dir = TempDir::new().unwrap();
        let batch = stager(&dir, 1024)
            .stage(
                ResourceKind::Book,
                vec![
                    IncomingFile::new("coverImage", "Cover.PNG", b"png".to_vec()),
                    IncomingFile::new("pdf", "book.pdf", b"pdf".to_vec()),
                    IncomingFile::new("images", "a.jpg", b"jpg".to_vec()).replacing("r9"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(batch.len(), 3);
        assert!(batch.has_slot(SlotName::Cover));
        assert_eq!(batch.items()[2].replaces.as_deref(), Some("r9"));
        assert!(batch.items()[0].file.path().to_string_lossy().ends_with(".png"));
        assert_eq!(staged_count(&dir), 3);

        drop(batch);
        assert_eq!(staged_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_unexpected_field() {
        let dir = TempDir::new().unwrap();
        let err = stager(&dir, 1024)
            .stage(
                ResourceKind::Category,
                vec![IncomingFile::new("pdf", "a.pdf", b"x".to_vec())],
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Unexpected field: pdf");
    }

    #[tokio::test]
    async fn test_rejection_removes_earlier_files() {
        let dir = TempDir::new().unwrap();
        let err = stager(&dir, 1024)
            .stage(
                ResourceKind::Category,
                vec![
                    IncomingFile::new("image", "a.png", b"x".to_vec()),
                    IncomingFile::new("image", "b.png", b"x".to_vec()),
                ],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unexpected field: image"));
        assert_eq!(staged_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_invalid_type_and_size() {
        let dir = TempDir::new().unwrap();
        let stager = stager(&dir, 4);

        let err = stager
            .stage(
                ResourceKind::Book,
                vec![IncomingFile::new("pdf", "book.exe", b"x".to_vec())],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));

        let err = stager
            .stage(
                ResourceKind::Book,
                vec![IncomingFile::new("pdf", "book.pdf", b"too big".to_vec())],
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("File size is too large"));
    }
}
