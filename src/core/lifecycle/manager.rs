//! Resource lifecycle manager
//!
//! Owns the ordering of blob and document operations for one request. Each public
//! workflow runs to completion or failure; nothing is coordinated across requests.
//!
//! Compensation policy: an uploaded blob that no persisted document references is
//! deleted once, best-effort, whichever step failed after the upload.

use crate::adapters::blob_store::BlobStore;
use crate::adapters::document_store::{decode, encode, DocumentStore};
use crate::config::schema::{FolioConfig, LifecycleConfig};
use crate::core::assets::{BlobBatchDeleter, BlobBatchUploader, UploadedAsset};
use crate::core::folder::{generate_folder_id, FolderKeyDeriver};
use crate::domain::{
    AssetDescriptor, AssetSlots, CompositeResource, FolderId, FolioError, ResourceId,
    ResourceKind, Result, SlotName, SlotValue, UploadBatch,
};
use std::sync::Arc;

/// Orchestrates create, update and delete of composite resources
#[derive(Clone)]
pub struct ResourceLifecycleManager {
    pub(super) documents: Arc<dyn DocumentStore + Send + Sync>,
    pub(super) uploader: BlobBatchUploader,
    pub(super) deleter: BlobBatchDeleter,
    pub(super) deriver: FolderKeyDeriver,
    pub(super) folder_id_length: usize,
}

impl ResourceLifecycleManager {
    /// Create a manager over the given stores
    pub fn new(
        documents: Arc<dyn DocumentStore + Send + Sync>,
        blobs: Arc<dyn BlobStore + Send + Sync>,
        deriver: FolderKeyDeriver,
        lifecycle: &LifecycleConfig,
    ) -> Self {
        Self {
            documents,
            uploader: BlobBatchUploader::new(blobs.clone(), deriver.clone()),
            deleter: BlobBatchDeleter::new(blobs),
            deriver,
            folder_id_length: lifecycle.folder_id_length,
        }
    }

    /// Create a manager using the root folder and lifecycle settings of a configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the root folder is malformed.
    pub fn from_config(
        config: &FolioConfig,
        documents: Arc<dyn DocumentStore + Send + Sync>,
        blobs: Arc<dyn BlobStore + Send + Sync>,
    ) -> Result<Self> {
        let deriver = FolderKeyDeriver::new(&config.blob_store.root_folder)?;
        Ok(Self::new(documents, blobs, deriver, &config.lifecycle))
    }

    /// Path deriver in use
    pub fn deriver(&self) -> &FolderKeyDeriver {
        &self.deriver
    }

    /// Load a resource by id
    pub async fn load<R: CompositeResource>(&self, id: &ResourceId) -> Result<R> {
        let collection = R::KIND.collection();
        match self.documents.find_by_id(collection, id.as_str()).await? {
            Some(document) => decode(collection, document),
            None => Err(FolioError::NotFound(format!(
                "{} not found",
                R::KIND.label()
            ))),
        }
    }

    pub(super) fn new_folder_id(&self) -> FolderId {
        generate_folder_id(self.folder_id_length)
    }

    /// Descriptor of a required slot, compensating the batch if it is missing
    pub(super) async fn take_required(
        &self,
        slots: &AssetSlots,
        slot: SlotName,
        uploaded: &[UploadedAsset],
    ) -> Result<AssetDescriptor> {
        match required_single(slots, slot) {
            Ok(descriptor) => Ok(descriptor),
            Err(e) => {
                self.deleter.compensate(uploaded).await;
                Err(e)
            }
        }
    }

    /// Persist a new resource, compensating its uploads on failure
    pub(super) async fn persist_new<R: CompositeResource>(
        &self,
        resource: &R,
        uploaded: &[UploadedAsset],
    ) -> Result<()> {
        let stored = match encode(resource) {
            Ok(document) => self.documents.create(R::KIND.collection(), document).await,
            Err(e) => Err(e),
        };
        if let Err(e) = stored {
            tracing::warn!(
                resource_id = %resource.id(),
                error = %e,
                "Persisting new resource failed; compensating uploads"
            );
            self.deleter.compensate(uploaded).await;
            return Err(e);
        }
        Ok(())
    }

    /// Replace a stored resource, compensating new uploads on failure
    pub(super) async fn persist_update<R: CompositeResource>(
        &self,
        resource: &R,
        uploaded: &[UploadedAsset],
    ) -> Result<R> {
        let stored = match encode(resource) {
            Ok(document) => {
                self.documents
                    .replace(R::KIND.collection(), resource.id().as_str(), document)
                    .await
            }
            Err(e) => Err(e),
        };
        match stored {
            Ok(Some(document)) => decode(R::KIND.collection(), document),
            Ok(None) => {
                self.deleter.compensate(uploaded).await;
                Err(FolioError::NotFound(format!("{} not found", R::KIND.label())))
            }
            Err(e) => {
                tracing::warn!(
                    resource_id = %resource.id(),
                    error = %e,
                    "Persisting update failed; compensating uploads"
                );
                self.deleter.compensate(uploaded).await;
                Err(e)
            }
        }
    }
}

/// Check a batch against the slots a kind declares
///
/// On create every required slot must have a staged file.
pub(super) fn validate_batch(kind: ResourceKind, batch: &UploadBatch, creating: bool) -> Result<()> {
    for upload in batch.items() {
        let Some(spec) = kind.slot_spec(upload.slot) else {
            return Err(FolioError::Validation(format!(
                "Unexpected field: {}",
                upload.slot
            )));
        };
        if batch.count_for(spec.name) > spec.max_items {
            return Err(FolioError::Validation(format!(
                "Unexpected field: {}",
                upload.slot
            )));
        }
    }

    if creating {
        for spec in kind.slot_specs().iter().filter(|s| s.required) {
            if !batch.has_slot(spec.name) {
                return Err(FolioError::Validation(format!(
                    "{} is required",
                    required_label(spec.name)
                )));
            }
        }
    }
    Ok(())
}

fn required_label(slot: SlotName) -> &'static str {
    match slot {
        SlotName::Image => "Image",
        SlotName::Cover => "Cover image",
        SlotName::Document => "PDF",
        SlotName::Gallery => "Gallery images",
    }
}

/// Slot values of a fresh resource, built from its uploads
pub(super) fn slots_from_uploads(uploaded: &[UploadedAsset]) -> AssetSlots {
    let mut slots = AssetSlots::new();
    let mut gallery: Vec<AssetDescriptor> = Vec::new();
    for asset in uploaded {
        if asset.slot.is_sequence() {
            gallery.push(asset.descriptor.clone());
        } else {
            slots.insert(asset.slot, SlotValue::Single(asset.descriptor.clone()));
        }
    }
    if !gallery.is_empty() {
        slots.insert(SlotName::Gallery, SlotValue::Sequence(gallery));
    }
    slots
}

/// Descriptor of a required single slot
fn required_single(slots: &AssetSlots, slot: SlotName) -> Result<AssetDescriptor> {
    slots.single(slot).cloned().ok_or_else(|| {
        FolioError::Validation(format!("{} is required", required_label(slot)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StagedUpload;

    fn batch(slots: &[SlotName]) -> UploadBatch {
        UploadBatch::new(
            slots
                .iter()
                .map(|s| StagedUpload::new(*s, format!("/nonexistent/{s}")))
                .collect(),
        )
    }

    #[test]
    fn test_missing_required_slot() {
        let err = validate_batch(ResourceKind::Book, &batch(&[SlotName::Cover]), true).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: PDF is required");

        let err = validate_batch(ResourceKind::Category, &batch(&[]), true).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Image is required");

        // updates may leave slots untouched
        assert!(validate_batch(ResourceKind::Book, &batch(&[]), false).is_ok());
    }

    #[test]
    fn test_undeclared_or_repeated_slot() {
        assert!(validate_batch(ResourceKind::Category, &batch(&[SlotName::Cover]), false).is_err());
        assert!(validate_batch(
            ResourceKind::Book,
            &batch(&[SlotName::Cover, SlotName::Cover, SlotName::Document]),
            true
        )
        .is_err());
    }

    #[test]
    fn test_slots_from_uploads_keeps_gallery_order() {
        let uploaded: Vec<_> = [
            (SlotName::Cover, "c"),
            (SlotName::Gallery, "g1"),
            (SlotName::Gallery, "g2"),
        ]
        .iter()
        .map(|(slot, id)| UploadedAsset {
            slot: *slot,
            descriptor: AssetDescriptor::new(*id, format!("u-{id}")),
            replaces: None,
        })
        .collect();

        let slots = slots_from_uploads(&uploaded);
        assert_eq!(slots.single(SlotName::Cover).unwrap().remote_id, "c");
        let gallery: Vec<_> = slots
            .sequence(SlotName::Gallery)
            .into_iter()
            .map(|d| d.remote_id)
            .collect();
        assert_eq!(gallery, vec!["g1", "g2"]);
        assert!(required_single(&slots, SlotName::Document).is_err());
    }
}
