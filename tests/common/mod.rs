//! Shared fixtures for integration tests
//!
//! Wraps the in-memory stores with scripted failures so workflows can be driven into
//! every failure branch while every call is still recorded.

#![allow(dead_code)]

use async_trait::async_trait;
use folio::adapters::blob_store::{BlobCall, BlobStore, InMemoryBlobStore};
use folio::adapters::document_store::{DocumentStore, InMemoryDocumentStore};
use folio::config::LifecycleConfig;
use folio::core::folder::FolderKeyDeriver;
use folio::core::lifecycle::ResourceLifecycleManager;
use folio::core::query::{Filter, RefinedQuery};
use chrono::Utc;
use folio::domain::{
    AssetDescriptor, AuthContext, BlobKind, BlobStoreError, Book, BookDraft, Category,
    DocumentStoreError, FolderId, FolderKey, Result, ResourceId, Role, SlotName, StagedUpload,
    UploadBatch, UserId,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ROOT: &str = "Folio";

/// Blob store that fails the calls it is told to fail
#[derive(Default)]
pub struct ScriptedBlobStore {
    inner: InMemoryBlobStore,
    failing_roles: Mutex<HashSet<String>>,
    failing_deletes: Mutex<HashSet<String>>,
    failed_deletes: Mutex<Vec<String>>,
    fail_prefix_deletes: AtomicBool,
    fail_every_delete: AtomicBool,
}

impl ScriptedBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail uploads whose destination ends with this role segment
    pub fn fail_uploads_for(&self, slot: SlotName) {
        self.failing_roles
            .lock()
            .unwrap()
            .insert(slot.role_segment().to_string());
    }

    /// Fail single deletes of this remote id
    pub fn fail_delete_of(&self, remote_id: &str) {
        self.failing_deletes
            .lock()
            .unwrap()
            .insert(remote_id.to_string());
    }

    pub fn fail_every_delete(&self) {
        self.fail_every_delete.store(true, Ordering::SeqCst);
    }

    pub fn fail_prefix_deletes(&self) {
        self.fail_prefix_deletes.store(true, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<BlobCall> {
        self.inner.calls().await
    }

    pub async fn upload_count(&self) -> usize {
        self.inner.upload_count().await
    }

    pub async fn deleted_ids(&self) -> Vec<String> {
        self.inner.deleted_ids().await
    }

    /// Every single-object delete attempted, failed ones included
    pub async fn delete_attempts(&self) -> Vec<String> {
        let mut attempts = self.inner.deleted_ids().await;
        attempts.extend(self.failed_deletes.lock().unwrap().iter().cloned());
        attempts
    }

    pub async fn objects(&self) -> Vec<String> {
        self.inner.objects().await
    }

    pub async fn contains(&self, remote_id: &str) -> bool {
        self.inner.contains(remote_id).await
    }

    /// Calls that mutate the store
    pub async fn mutation_count(&self) -> usize {
        self.calls().await.len()
    }
}

#[async_trait]
impl BlobStore for ScriptedBlobStore {
    fn backend_name(&self) -> &str {
        "scripted"
    }

    async fn upload(
        &self,
        local_path: &Path,
        dest_prefix: &FolderKey,
        kind: BlobKind,
    ) -> Result<AssetDescriptor> {
        let fails = self
            .failing_roles
            .lock()
            .unwrap()
            .contains(dest_prefix.last_segment());
        if fails {
            return Err(BlobStoreError::UploadFailed(format!("scripted failure for {dest_prefix}")).into());
        }
        self.inner.upload(local_path, dest_prefix, kind).await
    }

    async fn delete(&self, remote_id: &str, kind: BlobKind) -> Result<()> {
        let fails = self.fail_every_delete.load(Ordering::SeqCst)
            || self.failing_deletes.lock().unwrap().contains(remote_id);
        if fails {
            self.failed_deletes
                .lock()
                .unwrap()
                .push(remote_id.to_string());
            return Err(BlobStoreError::DeleteFailed {
                remote_id: remote_id.to_string(),
                message: "scripted failure".to_string(),
            }
            .into());
        }
        self.inner.delete(remote_id, kind).await
    }

    async fn delete_by_prefix(&self, prefix: &FolderKey) -> Result<()> {
        if self.fail_prefix_deletes.load(Ordering::SeqCst) {
            return Err(BlobStoreError::FolderRemovalFailed {
                prefix: prefix.to_string(),
                message: "scripted failure".to_string(),
            }
            .into());
        }
        self.inner.delete_by_prefix(prefix).await
    }

    async fn delete_folder(&self, prefix: &FolderKey) -> Result<()> {
        self.inner.delete_folder(prefix).await
    }
}

/// Document store whose writes can be switched to fail
#[derive(Default)]
pub struct FlakyDocumentStore {
    inner: InMemoryDocumentStore,
    fail_create: AtomicBool,
    fail_replace: AtomicBool,
    fail_delete: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_replace(&self) {
        self.fail_replace.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Successful or attempted write calls
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        self.inner.seed(collection, documents).await;
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.inner.len(collection).await
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for FlakyDocumentStore {
    fn backend_name(&self) -> &str {
        "flaky"
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.inner.find_by_id(collection, id).await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        self.inner.find_one(collection, filter).await
    }

    async fn find(&self, query: &RefinedQuery) -> Result<Vec<Value>> {
        self.inner.find(query).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.inner.count(collection, filter).await
    }

    async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        self.record_write();
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::InsertFailed("scripted failure".to_string()).into());
        }
        self.inner.create(collection, document).await
    }

    async fn replace(&self, collection: &str, id: &str, document: Value) -> Result<Option<Value>> {
        self.record_write();
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::UpdateFailed("scripted failure".to_string()).into());
        }
        self.inner.replace(collection, id, document).await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.record_write();
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DocumentStoreError::DeleteFailed("scripted failure".to_string()).into());
        }
        self.inner.delete_by_id(collection, id).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        self.record_write();
        self.inner.delete_many(collection, filter).await
    }
}

/// Manager over scripted stores plus a directory for staged files
pub struct Harness {
    pub documents: Arc<FlakyDocumentStore>,
    pub blobs: Arc<ScriptedBlobStore>,
    pub manager: ResourceLifecycleManager,
    staging: TempDir,
    counter: AtomicUsize,
}

impl Harness {
    pub async fn new() -> Self {
        let documents = Arc::new(FlakyDocumentStore::new());
        let blobs = Arc::new(ScriptedBlobStore::new());
        let manager = ResourceLifecycleManager::new(
            documents.clone(),
            blobs.clone(),
            FolderKeyDeriver::new(ROOT).unwrap(),
            &LifecycleConfig::default(),
        );
        documents
            .seed(
                "users",
                vec![
                    json!({"_id": "author-1", "email": "a1@example.com"}),
                    json!({"_id": "author-2", "email": "a2@example.com"}),
                ],
            )
            .await;

        Self {
            documents,
            blobs,
            manager,
            staging: TempDir::new().unwrap(),
            counter: AtomicUsize::new(0),
        }
    }

    /// Write a file to the staging directory
    pub fn stage_file(&self, extension: &str) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.staging.path().join(format!("file{n}.{extension}"));
        std::fs::write(&path, b"content").unwrap();
        path
    }

    pub fn upload(&self, slot: SlotName) -> StagedUpload {
        let extension = if slot == SlotName::Document { "pdf" } else { "png" };
        StagedUpload::new(slot, self.stage_file(extension))
    }

    pub fn batch(&self, slots: &[SlotName]) -> UploadBatch {
        UploadBatch::new(slots.iter().map(|s| self.upload(*s)).collect())
    }

    /// Store a category directly, bypassing the workflow
    pub async fn seed_category(&self, id: &str, owner: &str, folder_id: &str) -> Category {
        let now = Utc::now();
        let category = Category {
            id: ResourceId::new(id).unwrap(),
            name: format!("Category {id}"),
            slug: format!("category-{id}"),
            image: AssetDescriptor::new(format!("{ROOT}/Categories/{folder_id}/image/img"), "u0"),
            folder_id: FolderId::new(folder_id).unwrap(),
            added_by: UserId::new(owner).unwrap(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .seed("categories", vec![serde_json::to_value(&category).unwrap()])
            .await;
        category
    }

    /// Store a book with cover `r1`/`u1`, document `r2`/`u2` and the given gallery ids
    pub async fn seed_book(&self, id: &str, owner: &str, category: &Category, gallery: &[&str]) -> Book {
        let now = Utc::now();
        let book = Book {
            id: ResourceId::new(id).unwrap(),
            title: format!("Book {id}"),
            slug: format!("book-{id}"),
            description: "A novel".to_string(),
            language: "en".to_string(),
            release_date: "1965-08-01".to_string(),
            pages: 412,
            category_id: category.id.clone(),
            author_id: UserId::new(owner).unwrap(),
            category_folder_id: category.folder_id.clone(),
            folder_id: FolderId::new(format!("f{id}")).unwrap(),
            cover: AssetDescriptor::new("r1", "u1"),
            document: AssetDescriptor::new("r2", "u2"),
            gallery: gallery
                .iter()
                .map(|g| AssetDescriptor::new(*g, format!("u-{g}")))
                .collect(),
            rate: 0.0,
            added_by: UserId::new(owner).unwrap(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .seed("books", vec![serde_json::to_value(&book).unwrap()])
            .await;
        book
    }

    /// Stored book, decoded
    pub async fn stored_book(&self, id: &str) -> Option<Book> {
        self.documents
            .find_by_id("books", id)
            .await
            .unwrap()
            .map(|doc| serde_json::from_value(doc).unwrap())
    }

    /// Files still present in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}

pub fn auth(id: &str, role: Role) -> AuthContext {
    AuthContext::new(UserId::new(id).unwrap(), role)
}

pub fn admin() -> AuthContext {
    auth("admin-1", Role::Admin)
}

pub fn author() -> AuthContext {
    auth("author-1", Role::Author)
}

pub fn book_draft(category_id: &ResourceId, title: &str) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        description: "A novel".to_string(),
        language: "en".to_string(),
        release_date: "1965-08-01".to_string(),
        pages: 412,
        category_id: category_id.clone(),
        author_id: UserId::new("author-1").unwrap(),
    }
}
