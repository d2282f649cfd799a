//! Best-effort removal of blobs and folder prefixes
//!
//! The deleter never aborts: every item is attempted and the outcome of each one is
//! returned to the caller, who decides what a failure means.

use super::report::{BlobOutcome, BlobTarget};
use super::uploader::UploadedAsset;
use crate::adapters::blob_store::BlobStore;
use crate::domain::{AssetDescriptor, BlobKind, FolderKey};
use crate::log_cleanup_failure;
use futures::future::join_all;
use std::sync::Arc;

/// Deletes known descriptors and folder subtrees
#[derive(Clone)]
pub struct BlobBatchDeleter {
    store: Arc<dyn BlobStore + Send + Sync>,
}

impl BlobBatchDeleter {
    /// Create a deleter
    pub fn new(store: Arc<dyn BlobStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Delete descriptors concurrently, then each prefix followed by its folder
    ///
    /// Outcomes are returned in the order of the inputs: descriptors first, then a
    /// prefix and a folder entry per folder key.
    pub async fn delete_all(
        &self,
        descriptors: &[(AssetDescriptor, BlobKind)],
        prefixes: &[FolderKey],
    ) -> Vec<BlobOutcome> {
        let mut outcomes = self.delete_descriptors(descriptors, "delete").await;

        for prefix in prefixes {
            let target = BlobTarget::Prefix(prefix.clone());
            outcomes.push(match self.store.delete_by_prefix(prefix).await {
                Ok(()) => BlobOutcome::succeeded(target),
                Err(e) => {
                    log_cleanup_failure!(prefix, e, "delete");
                    BlobOutcome::failed(target, e)
                }
            });

            let target = BlobTarget::Folder(prefix.clone());
            outcomes.push(match self.store.delete_folder(prefix).await {
                Ok(()) => BlobOutcome::succeeded(target),
                Err(e) => {
                    log_cleanup_failure!(prefix, e, "delete");
                    BlobOutcome::failed(target, e)
                }
            });
        }

        outcomes
    }

    /// Retire descriptors replaced by an update
    pub async fn retire(&self, descriptors: &[(AssetDescriptor, BlobKind)]) -> Vec<BlobOutcome> {
        self.delete_descriptors(descriptors, "retire").await
    }

    /// Delete uploads no persisted document references
    ///
    /// Attempted once; failures are logged and otherwise dropped.
    pub async fn compensate(&self, uploaded: &[UploadedAsset]) {
        if uploaded.is_empty() {
            return;
        }
        let descriptors: Vec<_> = uploaded
            .iter()
            .map(|u| (u.descriptor.clone(), u.slot.blob_kind()))
            .collect();
        let outcomes = self.delete_descriptors(&descriptors, "compensation").await;

        tracing::info!(
            attempted = outcomes.len(),
            failed = outcomes.iter().filter(|o| !o.ok).count(),
            "Compensated uploaded assets"
        );
    }

    async fn delete_descriptors(
        &self,
        descriptors: &[(AssetDescriptor, BlobKind)],
        phase: &'static str,
    ) -> Vec<BlobOutcome> {
        join_all(descriptors.iter().map(|(descriptor, kind)| async move {
            let target = BlobTarget::Object(descriptor.remote_id.clone());
            match self.store.delete(&descriptor.remote_id, *kind).await {
                Ok(()) => BlobOutcome::succeeded(target),
                Err(e) => {
                    log_cleanup_failure!(descriptor.remote_id, e, phase);
                    BlobOutcome::failed(target, e)
                }
            }
        }))
        .await
    }
}
