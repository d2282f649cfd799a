//! Update workflows
//!
//! `Pending → Loaded → Authorized → FieldsMerged → AssetsReplaced → Persisted`
//!
//! Only fields and slots present in the request are touched. A replaced asset is
//! retired only after its successor is uploaded and the document is stored.

use super::authz::{require_owner, require_write_role};
use super::manager::{validate_batch, ResourceLifecycleManager};
use super::outcome::Updated;
use crate::core::assets::{CleanupReport, UploadedAsset};
use crate::core::query::Filter;
use crate::domain::resource::{slugify, MAX_GALLERY_ITEMS};
use crate::domain::{
    AssetDescriptor, AuthContext, BlobKind, Book, BookPatch, Category, CategoryPatch,
    CompositeResource, FolioError, ResourceId, ResourceKind, Result, SlotName, SlotValue,
    UploadBatch,
};
use crate::log_transition;
use chrono::Utc;
use std::collections::HashSet;

impl ResourceLifecycleManager {
    /// Rename a category and/or replace its image
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write categories or does not own this one
    /// - `NotFound` if the category does not exist
    /// - `Validation` if the new name equals the current one
    /// - `Conflict` if the new name is taken
    /// - `UpstreamFailure` if the upload or the store call fails
    pub async fn update_category(
        &self,
        id: &ResourceId,
        patch: CategoryPatch,
        auth: &AuthContext,
        batch: UploadBatch,
    ) -> Result<Updated<Category>> {
        let kind = ResourceKind::Category;
        log_transition!("update", kind, "Pending", id);

        require_write_role(auth, kind, "update")?;
        let mut category: Category = self.load(id).await?;
        log_transition!("update", kind, "Loaded", id);
        require_owner(auth, &category, "update")?;
        log_transition!("update", kind, "Authorized", id);

        if let Some(name) = patch.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(FolioError::Validation("Category name cannot be empty".to_string()));
            }
            if name == category.name {
                return Err(FolioError::Validation(
                    "Please enter different category name from the existing one.".to_string(),
                ));
            }
            let taken = self
                .documents
                .find_one(kind.collection(), &Filter::eq("name", name.as_str())?)
                .await?;
            if taken.is_some() {
                return Err(FolioError::Conflict("Category name is already exist".to_string()));
            }
            category.slug = slugify(&name);
            category.name = name;
        }
        validate_batch(kind, &batch, false)?;
        check_replacements(&category, &batch)?;
        log_transition!("update", kind, "FieldsMerged", id);

        self.replace_assets_and_persist(category, batch, auth).await
    }

    /// Update book fields and replace or add assets
    ///
    /// Gallery uploads are appended, or replace the item named by
    /// [`crate::domain::StagedUpload::replaces`].
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write books or does not own this one
    /// - `NotFound` if the book does not exist
    /// - `Validation` for an invalid field or an unknown replacement target
    /// - `UpstreamFailure` if an upload or the store call fails
    pub async fn update_book(
        &self,
        id: &ResourceId,
        patch: BookPatch,
        auth: &AuthContext,
        batch: UploadBatch,
    ) -> Result<Updated<Book>> {
        let kind = ResourceKind::Book;
        log_transition!("update", kind, "Pending", id);

        require_write_role(auth, kind, "update")?;
        let mut book: Book = self.load(id).await?;
        log_transition!("update", kind, "Loaded", id);
        require_owner(auth, &book, "update")?;
        log_transition!("update", kind, "Authorized", id);

        patch.apply_to(&mut book).map_err(FolioError::Validation)?;
        validate_batch(kind, &batch, false)?;
        check_replacements(&book, &batch)?;
        log_transition!("update", kind, "FieldsMerged", id);

        self.replace_assets_and_persist(book, batch, auth).await
    }

    async fn replace_assets_and_persist<R: CompositeResource>(
        &self,
        mut resource: R,
        batch: UploadBatch,
        auth: &AuthContext,
    ) -> Result<Updated<R>> {
        let folder = self.deriver.subtree_of(&resource)?;

        let uploaded = if batch.is_empty() {
            Vec::new()
        } else {
            let outcome = self.uploader.upload(batch, &folder).await;
            if let Some(e) = outcome.error {
                self.deleter.compensate(&outcome.uploaded).await;
                return Err(e);
            }
            outcome.uploaded
        };

        let retired = match apply_uploads(&mut resource, &uploaded) {
            Ok(retired) => retired,
            Err(e) => {
                self.deleter.compensate(&uploaded).await;
                return Err(e);
            }
        };
        log_transition!("update", R::KIND, "AssetsReplaced", resource.id());

        resource.mark_updated(&auth.caller_id, Utc::now());
        let stored = self.persist_update(&resource, &uploaded).await?;
        log_transition!("update", R::KIND, "Persisted", stored.id());

        let cleanup = CleanupReport::new(self.deleter.retire(&retired).await);
        if !cleanup.is_clean() {
            tracing::warn!(
                resource_id = %stored.id(),
                failures = cleanup.failures().len(),
                "Some replaced assets could not be retired"
            );
        }
        tracing::info!(
            resource_id = %stored.id(),
            folder = %folder,
            replaced = uploaded.len(),
            "{} updated",
            R::KIND
        );

        Ok(Updated {
            resource: stored,
            folder,
            cleanup,
        })
    }
}

/// Reject replacement targets the resource does not hold, before any upload
fn check_replacements<R: CompositeResource>(resource: &R, batch: &UploadBatch) -> Result<()> {
    let slots = resource.slots();
    let mut appended = 0;
    let mut targets = HashSet::new();

    for upload in batch.items() {
        let Some(target) = upload.replaces.as_deref() else {
            if upload.slot.is_sequence() {
                appended += 1;
            }
            continue;
        };
        if !targets.insert((upload.slot, target)) {
            return Err(FolioError::Validation(format!(
                "'{target}' is replaced more than once"
            )));
        }

        let held = if upload.slot.is_sequence() {
            slots
                .sequence(upload.slot)
                .iter()
                .any(|d| d.remote_id == target)
        } else {
            slots
                .single(upload.slot)
                .is_some_and(|d| d.remote_id == target)
        };
        if !held {
            return Err(FolioError::Validation(format!(
                "'{target}' is not a current {} asset of this {}",
                upload.slot,
                R::KIND.label().to_lowercase()
            )));
        }
    }

    if appended > 0 && slots.sequence(SlotName::Gallery).len() + appended > MAX_GALLERY_ITEMS {
        return Err(FolioError::Validation(format!(
            "A gallery holds at most {MAX_GALLERY_ITEMS} images"
        )));
    }
    Ok(())
}

/// Write uploads into their slots and return the descriptors they displaced
fn apply_uploads<R: CompositeResource>(
    resource: &mut R,
    uploaded: &[UploadedAsset],
) -> Result<Vec<(AssetDescriptor, BlobKind)>> {
    let mut retired = Vec::new();

    for asset in uploaded {
        let kind = asset.slot.blob_kind();
        let slots = resource.slots();

        let value = if asset.slot.is_sequence() {
            let mut items = slots.sequence(asset.slot);
            let position = asset
                .replaces
                .as_deref()
                .and_then(|target| items.iter().position(|d| d.remote_id == target));
            match position {
                Some(index) => {
                    let old = std::mem::replace(&mut items[index], asset.descriptor.clone());
                    retired.push((old, kind));
                }
                None => items.push(asset.descriptor.clone()),
            }
            SlotValue::Sequence(items)
        } else {
            if let Some(old) = slots.single(asset.slot) {
                if old.remote_id != asset.descriptor.remote_id {
                    retired.push((old.clone(), kind));
                }
            }
            SlotValue::Single(asset.descriptor.clone())
        };

        resource
            .set_slot(asset.slot, value)
            .map_err(FolioError::Validation)?;
    }

    Ok(retired)
}
