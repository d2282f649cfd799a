//! Core business logic for Folio.
//!
//! This module contains the workflows that keep a resource's document and its remote
//! assets consistent, plus listing-query composition.
//!
//! # Modules
//!
//! - [`folder`] - Storage path derivation and folder token generation
//! - [`assets`] - Concurrent batch upload and best-effort batch deletion
//! - [`lifecycle`] - Create, update and delete workflows
//! - [`query`] - Listing queries from untyped request parameters
//! - [`rating`] - Book rate from reviews
//!
//! # Lifecycle Workflow
//!
//! A create runs through:
//!
//! 1. **Validate**: role gate, natural key, parent existence, required files staged
//! 2. **Derive Folder**: generate a folder token and compute the subtree
//! 3. **Upload**: every staged file concurrently; staged files are always released
//! 4. **Persist**: write the document; on failure the uploads are compensated
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::adapters::document_store::InMemoryDocumentStore;
//! use folio::core::query::{query_resources, BaseQuery, QueryFeatureComposer, RawParams};
//! use folio::domain::ResourceKind;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryDocumentStore::new();
//! let params = RawParams::parse("page=2&size=5&sort=title%20asc&pages[gte]=100")?;
//! let books = query_resources(
//!     &store,
//!     &QueryFeatureComposer::default(),
//!     &params,
//!     BaseQuery::of(ResourceKind::Book),
//! )
//! .await?;
//! println!("{} books", books.len());
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod folder;
pub mod lifecycle;
pub mod query;
pub mod rating;
