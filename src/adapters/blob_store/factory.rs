//! Blob store factory

use super::local::LocalBlobStore;
use super::memory::InMemoryBlobStore;
use super::traits::BlobStore;
use crate::adapters::cloudinary::CloudinaryBlobStore;
use crate::config::schema::{BlobStoreBackend, FolioConfig};
use crate::domain::{FolioError, Result};
use std::sync::Arc;

/// Create a blob store based on the configuration
///
/// # Errors
///
/// Returns an error if the selected backend has no configuration section.
pub fn create_blob_store(config: &FolioConfig) -> Result<Arc<dyn BlobStore + Send + Sync>> {
    match config.blob_store.backend {
        BlobStoreBackend::Memory => {
            tracing::info!("Creating in-memory blob store");
            Ok(Arc::new(InMemoryBlobStore::new()) as Arc<dyn BlobStore + Send + Sync>)
        }
        BlobStoreBackend::Local => {
            let local = config.local_blob.as_ref().ok_or_else(|| {
                FolioError::Configuration(
                    "[local_blob] section is required for the local backend".to_string(),
                )
            })?;
            tracing::info!(root_dir = %local.root_dir, "Creating local blob store");
            Ok(Arc::new(LocalBlobStore::from_config(local)) as Arc<dyn BlobStore + Send + Sync>)
        }
        BlobStoreBackend::Cloudinary => {
            let cloudinary = config.cloudinary.as_ref().ok_or_else(|| {
                FolioError::Configuration(
                    "[cloudinary] section is required for the cloudinary backend".to_string(),
                )
            })?;
            tracing::info!(cloud_name = %cloudinary.cloud_name, "Creating Cloudinary blob store");
            Ok(Arc::new(CloudinaryBlobStore::new(cloudinary.clone())?)
                as Arc<dyn BlobStore + Send + Sync>)
        }
    }
}
