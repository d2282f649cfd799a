//! Blob store abstraction
//!
//! This module defines the trait that remote object store adapters must implement to
//! work with Folio.

use crate::domain::{AssetDescriptor, BlobKind, FolderKey, Result};
use async_trait::async_trait;
use std::path::Path;

/// Remote object store holding resource assets
///
/// Objects are addressed by an opaque remote id that starts with the folder prefix the
/// object was uploaded under. Calls are not retried by callers; implementations apply
/// their own timeouts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &str;

    /// Upload a local file below `dest_prefix`
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the file cannot be read or the store rejects it.
    async fn upload(
        &self,
        local_path: &Path,
        dest_prefix: &FolderKey,
        kind: BlobKind,
    ) -> Result<AssetDescriptor>;

    /// Delete one object
    async fn delete(&self, remote_id: &str, kind: BlobKind) -> Result<()>;

    /// Delete every object whose remote id starts with `prefix`
    async fn delete_by_prefix(&self, prefix: &FolderKey) -> Result<()>;

    /// Remove the (now empty) folder itself
    async fn delete_folder(&self, prefix: &FolderKey) -> Result<()>;
}
