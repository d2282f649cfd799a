//! Concurrent upload of a staged batch
//!
//! Every slot upload runs concurrently and the batch waits for all of them, so the
//! descriptors of uploads that succeeded next to a failed one are known and can be
//! compensated. Each staged file is removed as soon as its own upload has finished.

use crate::adapters::blob_store::BlobStore;
use crate::core::folder::FolderKeyDeriver;
use crate::domain::{
    AssetDescriptor, FolderKey, FolioError, Result, SlotName, StagedUpload, UploadBatch,
};
use futures::future::join_all;
use std::sync::Arc;

/// One successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// Slot it was uploaded for
    pub slot: SlotName,
    /// Remote handle
    pub descriptor: AssetDescriptor,
    /// Remote id of the sequence item it replaces
    pub replaces: Option<String>,
}

/// Result of uploading a batch
///
/// `uploaded` keeps batch order and is filled even when `error` is set.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    /// Uploads that succeeded
    pub uploaded: Vec<UploadedAsset>,
    /// First failure, in batch order
    pub error: Option<FolioError>,
}

impl UploadOutcome {
    /// Whether every upload succeeded
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Uploads staged files to their slot prefixes
#[derive(Clone)]
pub struct BlobBatchUploader {
    store: Arc<dyn BlobStore + Send + Sync>,
    deriver: FolderKeyDeriver,
}

impl BlobBatchUploader {
    /// Create an uploader
    pub fn new(store: Arc<dyn BlobStore + Send + Sync>, deriver: FolderKeyDeriver) -> Self {
        Self { store, deriver }
    }

    /// Upload every file of the batch below `subtree`
    ///
    /// Never returns early: all uploads are awaited and every staged file is released.
    pub async fn upload(&self, batch: UploadBatch, subtree: &FolderKey) -> UploadOutcome {
        let results = join_all(
            batch
                .into_items()
                .into_iter()
                .map(|item| self.upload_one(item, subtree)),
        )
        .await;

        let mut outcome = UploadOutcome::default();
        for result in results {
            match result {
                Ok(asset) => outcome.uploaded.push(asset),
                Err(e) if outcome.error.is_none() => outcome.error = Some(e),
                Err(e) => {
                    tracing::warn!(error = %e, "Additional upload failure in batch");
                }
            }
        }

        tracing::debug!(
            folder = %subtree,
            uploaded = outcome.uploaded.len(),
            failed = !outcome.is_complete(),
            "Upload batch finished"
        );
        outcome
    }

    async fn upload_one(&self, item: StagedUpload, subtree: &FolderKey) -> Result<UploadedAsset> {
        let StagedUpload {
            slot,
            file,
            replaces,
        } = item;

        let result = match self.deriver.slot_prefix(subtree, slot) {
            Ok(prefix) => self.store.upload(file.path(), &prefix, slot.blob_kind()).await,
            Err(e) => Err(e),
        };
        file.release().await;

        match result {
            Ok(descriptor) => {
                tracing::debug!(slot = %slot, remote_id = %descriptor.remote_id, "Uploaded asset");
                Ok(UploadedAsset {
                    slot,
                    descriptor,
                    replaces,
                })
            }
            Err(e) => {
                tracing::warn!(slot = %slot, error = %e, "Asset upload failed");
                Err(e)
            }
        }
    }
}
