//! Local directory blob store
//!
//! Objects are plain files under a root directory; the remote id is the folder prefix
//! plus a generated token and doubles as the relative path.

use super::traits::BlobStore;
use crate::config::schema::LocalBlobConfig;
use crate::domain::{AssetDescriptor, BlobKind, BlobStoreError, FolderKey, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

/// Blob store writing objects below a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store from configuration
    pub fn from_config(config: &LocalBlobConfig) -> Self {
        Self::new(&config.root_dir)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if relative.split('/').any(|s| s == ".." || s == ".") {
            return Err(BlobStoreError::ClientError {
                status: 400,
                message: format!("Invalid object path '{relative}'"),
            }
            .into());
        }
        Ok(self.root.join(relative))
    }

    fn url_for(path: &Path) -> Result<String> {
        let absolute = std::path::absolute(path)
            .map_err(|e| BlobStoreError::UploadFailed(e.to_string()))?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|_| {
                BlobStoreError::InvalidResponse(format!("No file URL for {}", absolute.display()))
                    .into()
            })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend_name(&self) -> &str {
        "local"
    }

    async fn upload(
        &self,
        local_path: &Path,
        dest_prefix: &FolderKey,
        kind: BlobKind,
    ) -> Result<AssetDescriptor> {
        let remote_id = format!("{}/{}", dest_prefix, Uuid::new_v4().simple());
        let target = self.resolve(&remote_id)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobStoreError::UploadFailed(e.to_string()))?;
        }
        tokio::fs::copy(local_path, &target).await.map_err(|e| {
            BlobStoreError::LocalFile(format!("{}: {}", local_path.display(), e))
        })?;

        tracing::debug!(remote_id = %remote_id, kind = kind.as_str(), "Stored local object");
        Ok(AssetDescriptor::new(remote_id, Self::url_for(&target)?))
    }

    async fn delete(&self, remote_id: &str, _kind: BlobKind) -> Result<()> {
        let target = self.resolve(remote_id)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::DeleteFailed {
                remote_id: remote_id.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    async fn delete_by_prefix(&self, prefix: &FolderKey) -> Result<()> {
        let failed = |e: std::io::Error| BlobStoreError::FolderRemovalFailed {
            prefix: prefix.to_string(),
            message: e.to_string(),
        };

        let mut pending = vec![self.resolve(prefix.as_str())?];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(failed(e).into()),
            };
            while let Some(entry) = entries.next_entry().await.map_err(failed)? {
                let file_type = entry.file_type().await.map_err(failed)?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else {
                    tokio::fs::remove_file(entry.path()).await.map_err(failed)?;
                }
            }
        }
        Ok(())
    }

    async fn delete_folder(&self, prefix: &FolderKey) -> Result<()> {
        let target = self.resolve(prefix.as_str())?;
        match tokio::fs::remove_dir_all(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::FolderRemovalFailed {
                prefix: prefix.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }
}
