//! Create, update and delete workflows for composite resources
//!
//! A composite resource spans a document in the document store and a subtree of
//! objects in the blob store. [`ResourceLifecycleManager`] sequences both sides:
//!
//! - **create**: every precondition is checked before the first upload; uploads run
//!   concurrently; the document is written last
//! - **update**: sparse; replaced assets are retired only after their successors are
//!   stored (upload-then-retire)
//! - **delete**: blobs are removed best-effort, then the document unconditionally
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::adapters::blob_store::InMemoryBlobStore;
//! use folio::adapters::document_store::InMemoryDocumentStore;
//! use folio::config::FolioConfig;
//! use folio::core::lifecycle::ResourceLifecycleManager;
//! use folio::domain::{AuthContext, CategoryDraft, Role, SlotName, StagedUpload, UploadBatch, UserId};
//! use std::sync::Arc;
//!
//! # async fn example() -> folio::domain::Result<()> {
//! let manager = ResourceLifecycleManager::from_config(
//!     &FolioConfig::default(),
//!     Arc::new(InMemoryDocumentStore::new()),
//!     Arc::new(InMemoryBlobStore::new()),
//! )?;
//!
//! let admin = AuthContext::new(UserId::new("u1").unwrap(), Role::Admin);
//! let batch = UploadBatch::new(vec![StagedUpload::new(SlotName::Image, "/tmp/poetry.png")]);
//! let created = manager
//!     .create_category(CategoryDraft::new("Poetry"), &admin, batch)
//!     .await?;
//! println!("stored under {}", created.folder);
//! # Ok(())
//! # }
//! ```

pub mod authz;
mod create;
mod delete;
pub mod manager;
pub mod outcome;
mod update;

pub use manager::ResourceLifecycleManager;
pub use outcome::{Created, Updated};
