// Folio - Composite resource lifecycle core for a catalog API
// Copyright (c) 2025 Folio Contributors
// Licensed under the MIT License

//! # Folio - Catalog Resource Lifecycle Core
//!
//! Folio keeps catalog resources (categories and books) consistent across two stores:
//! a document store holding their metadata and a remote object store holding their
//! files (images, PDFs, galleries).
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Creating** resources: validate, derive a storage folder, upload files
//!   concurrently, then persist the document
//! - **Updating** resources: merge sparse fields, upload replacements, persist, then
//!   retire the replaced files
//! - **Deleting** resources: best-effort removal of every remote file and folder, then
//!   the document (cascading to a category's books)
//! - **Listing** resources: turning untyped request parameters into a filtered, sorted
//!   and paginated store query
//!
//! ## Architecture
//!
//! Folio follows a layered architecture:
//!
//! - [`cli`] - Operator command-line interface
//! - [`core`] - Business logic (folder keys, asset batches, lifecycle, query, rating)
//! - [`adapters`] - Document stores, blob stores and upload staging
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio::adapters::blob_store::InMemoryBlobStore;
//! use folio::adapters::document_store::InMemoryDocumentStore;
//! use folio::config::FolioConfig;
//! use folio::core::lifecycle::ResourceLifecycleManager;
//! use folio::domain::{AuthContext, CategoryDraft, Role, SlotName, StagedUpload, UploadBatch, UserId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ResourceLifecycleManager::from_config(
//!         &FolioConfig::default(),
//!         Arc::new(InMemoryDocumentStore::new()),
//!         Arc::new(InMemoryBlobStore::new()),
//!     )?;
//!
//!     let admin = AuthContext::new(UserId::new("u1")?, Role::Admin);
//!     let batch = UploadBatch::new(vec![StagedUpload::new(SlotName::Image, "/tmp/fiction.png")]);
//!     let created = manager
//!         .create_category(CategoryDraft::new("Fiction"), &admin, batch)
//!         .await?;
//!
//!     println!("Created {} under {}", created.resource.name, created.folder);
//!     Ok(())
//! }
//! ```
//!
//! ## Consistency
//!
//! Failures are never rolled back across stores. Instead every file uploaded during a
//! workflow that ends up unreferenced is deleted once, best-effort, and cleanup failures
//! are reported in the workflow result rather than raised.
//!
//! ## Error Handling
//!
//! Folio uses the [`domain::FolioError`] type for all errors; its
//! [`kind`](domain::FolioError::kind) maps to the caller-visible categories
//! (validation, forbidden, not found, conflict, upstream failure).

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
