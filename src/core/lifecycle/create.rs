//! Create workflows
//!
//! `Pending → Validated → FolderDerived → AssetsUploaded → DocumentPersisted`

use super::authz::require_write_role;
use super::manager::{slots_from_uploads, validate_batch, ResourceLifecycleManager};
use super::outcome::Created;
use crate::adapters::document_store::decode;
use crate::core::query::Filter;
use crate::domain::resource::slugify;
use crate::domain::{
    AuthContext, Book, BookDraft, Category, CategoryDraft, FolioError, ResourceId, ResourceKind,
    Result, SlotName, UploadBatch,
};
use crate::log_transition;
use chrono::Utc;

const USERS_COLLECTION: &str = "users";

impl ResourceLifecycleManager {
    /// Create a category with its image
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write categories
    /// - `Conflict` if the name is taken
    /// - `Validation` if the draft is invalid or no image is staged
    /// - `UpstreamFailure` if the upload or the insert fails (uploads are compensated)
    pub async fn create_category(
        &self,
        draft: CategoryDraft,
        auth: &AuthContext,
        batch: UploadBatch,
    ) -> Result<Created<Category>> {
        let kind = ResourceKind::Category;
        log_transition!("create", kind, "Pending");

        require_write_role(auth, kind, "add")?;
        draft.validate().map_err(FolioError::Validation)?;
        let name = draft.name.trim().to_string();

        let duplicate = self
            .documents
            .find_one(kind.collection(), &Filter::eq("name", name.as_str())?)
            .await?;
        if duplicate.is_some() {
            return Err(FolioError::Conflict("Category name is already exist".to_string()));
        }
        validate_batch(kind, &batch, true)?;
        log_transition!("create", kind, "Validated");

        let folder_id = self.new_folder_id();
        let folder = self.deriver.category_subtree(&folder_id)?;
        log_transition!("create", kind, "FolderDerived");

        let outcome = self.uploader.upload(batch, &folder).await;
        if let Some(e) = outcome.error {
            self.deleter.compensate(&outcome.uploaded).await;
            return Err(e);
        }
        log_transition!("create", kind, "AssetsUploaded");

        let slots = slots_from_uploads(&outcome.uploaded);
        let image = self
            .take_required(&slots, SlotName::Image, &outcome.uploaded)
            .await?;
        let now = Utc::now();
        let category = Category {
            id: ResourceId::generate(),
            slug: slugify(&name),
            name,
            image,
            folder_id,
            added_by: auth.caller_id.clone(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        self.persist_new(&category, &outcome.uploaded).await?;
        log_transition!("create", kind, "DocumentPersisted", category.id);
        tracing::info!(resource_id = %category.id, folder = %folder, "Category created");

        Ok(Created {
            resource: category,
            folder,
        })
    }

    /// Create a book with its cover, document and optional gallery
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the caller may not write books
    /// - `NotFound` if the category or the author does not exist
    /// - `Conflict` if the same title exists for this category and author
    /// - `Validation` if the draft is invalid or a required file is missing
    /// - `UpstreamFailure` if an upload or the insert fails (uploads are compensated)
    pub async fn create_book(
        &self,
        draft: BookDraft,
        auth: &AuthContext,
        batch: UploadBatch,
    ) -> Result<Created<Book>> {
        let kind = ResourceKind::Book;
        log_transition!("create", kind, "Pending");

        require_write_role(auth, kind, "add")?;
        draft.validate().map_err(FolioError::Validation)?;

        let category: Category = match self
            .documents
            .find_by_id(ResourceKind::Category.collection(), draft.category_id.as_str())
            .await?
        {
            Some(document) => decode(ResourceKind::Category.collection(), document)?,
            None => return Err(FolioError::NotFound("Category not found".to_string())),
        };

        let author = self
            .documents
            .find_by_id(USERS_COLLECTION, draft.author_id.as_str())
            .await?;
        if author.is_none() {
            return Err(FolioError::NotFound("Author not found".to_string()));
        }

        let natural_key = Filter::eq("title", draft.title.as_str())?
            .and(Filter::eq("categoryId", draft.category_id.as_str())?)
            .and(Filter::eq("authorId", draft.author_id.as_str())?);
        if self
            .documents
            .find_one(kind.collection(), &natural_key)
            .await?
            .is_some()
        {
            return Err(FolioError::Conflict("Book already exists".to_string()));
        }

        validate_batch(kind, &batch, true)?;
        log_transition!("create", kind, "Validated");

        let folder_id = self.new_folder_id();
        let folder = self.deriver.book_subtree(&category.folder_id, &folder_id)?;
        log_transition!("create", kind, "FolderDerived");

        let outcome = self.uploader.upload(batch, &folder).await;
        if let Some(e) = outcome.error {
            self.deleter.compensate(&outcome.uploaded).await;
            return Err(e);
        }
        log_transition!("create", kind, "AssetsUploaded");

        let slots = slots_from_uploads(&outcome.uploaded);
        let cover = self
            .take_required(&slots, SlotName::Cover, &outcome.uploaded)
            .await?;
        let document = self
            .take_required(&slots, SlotName::Document, &outcome.uploaded)
            .await?;
        let now = Utc::now();
        let book = Book {
            id: ResourceId::generate(),
            slug: slugify(&draft.title),
            title: draft.title,
            description: draft.description,
            language: draft.language,
            release_date: draft.release_date,
            pages: draft.pages,
            category_id: draft.category_id,
            author_id: draft.author_id,
            category_folder_id: category.folder_id,
            folder_id,
            cover,
            document,
            gallery: slots.sequence(SlotName::Gallery),
            rate: 0.0,
            added_by: auth.caller_id.clone(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        self.persist_new(&book, &outcome.uploaded).await?;
        log_transition!("create", kind, "DocumentPersisted", book.id);
        tracing::info!(resource_id = %book.id, folder = %folder, "Book created");

        Ok(Created {
            resource: book,
            folder,
        })
    }
}
