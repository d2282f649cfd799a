//! Delete workflows
//!
//! `Pending → Authorized → Loaded → BlobsBestEffortRemoved → DocumentRemoved`
//!
//! The document store is authoritative: blob removal is attempted in full and its
//! failures are reported, but only a failed document delete fails the workflow.

use super::authz::{require_owner, require_write_role};
use super::manager::ResourceLifecycleManager;
use crate::core::assets::DeletionReport;
use crate::core::query::Filter;
use crate::domain::{
    AuthContext, Book, Category, CompositeResource, ResourceId, ResourceKind, Result,
};
use crate::log_transition;

impl ResourceLifecycleManager {
    /// Delete a book, its assets and its subtree
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write books or does not own this one
    /// - `NotFound` if the book does not exist
    /// - `UpstreamFailure` only if the final document delete fails
    pub async fn delete_book(&self, id: &ResourceId, auth: &AuthContext) -> Result<DeletionReport> {
        self.delete_resource::<Book>(id, auth).await
    }

    /// Delete a category, every book filed under it, and the whole category subtree
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write categories or does not own this one
    /// - `NotFound` if the category does not exist
    /// - `UpstreamFailure` only if a document delete fails
    pub async fn delete_category(
        &self,
        id: &ResourceId,
        auth: &AuthContext,
    ) -> Result<DeletionReport> {
        let mut report = self.delete_resource::<Category>(id, auth).await?;

        let dependents = Filter::eq("categoryId", id.as_str())?;
        report.cascaded_documents = self
            .documents
            .delete_many(ResourceKind::Book.collection(), &dependents)
            .await?;
        if report.cascaded_documents == 0 {
            tracing::debug!(resource_id = %id, "Category had no books");
        }

        tracing::info!(
            resource_id = %id,
            cascaded = report.cascaded_documents,
            "Category books removed"
        );
        Ok(report)
    }

    async fn delete_resource<R: CompositeResource>(
        &self,
        id: &ResourceId,
        auth: &AuthContext,
    ) -> Result<DeletionReport> {
        log_transition!("delete", R::KIND, "Pending", id);

        require_write_role(auth, R::KIND, "delete")?;
        let resource: R = self.load(id).await?;
        require_owner(auth, &resource, "delete")?;
        log_transition!("delete", R::KIND, "Authorized", id);
        log_transition!("delete", R::KIND, "Loaded", id);

        let folder = self.deriver.subtree_of(&resource)?;
        let descriptors: Vec<_> = resource
            .slots()
            .descriptors()
            .into_iter()
            .map(|(slot, descriptor)| (descriptor, slot.blob_kind()))
            .collect();
        let outcomes = self
            .deleter
            .delete_all(&descriptors, std::slice::from_ref(&folder))
            .await;
        log_transition!("delete", R::KIND, "BlobsBestEffortRemoved", id);

        let removed = self
            .documents
            .delete_by_id(R::KIND.collection(), id.as_str())
            .await?;
        log_transition!("delete", R::KIND, "DocumentRemoved", id);

        let report = DeletionReport {
            resource_id: id.clone(),
            folder,
            outcomes,
            document_removed: removed.is_some(),
            cascaded_documents: 0,
        };
        if report.is_clean() {
            tracing::info!(resource_id = %id, folder = %report.folder, "{} deleted", R::KIND);
        } else {
            tracing::warn!(
                resource_id = %id,
                folder = %report.folder,
                failures = report.failures().len(),
                "{} deleted; some remote assets were left behind",
                R::KIND
            );
        }
        Ok(report)
    }
}
