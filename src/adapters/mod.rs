//! External system integrations for Folio.
//!
//! This module provides adapters for the systems the lifecycle workflows consume:
//!
//! - [`document_store`] - Document store abstraction (trait-based) with an in-memory backend
//! - [`postgresql`] - PostgreSQL `jsonb` document store
//! - [`blob_store`] - Remote object store abstraction with in-memory and local backends
//! - [`cloudinary`] - Cloudinary media API implementation
//! - [`staging`] - Local staging of multipart uploads
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. Backends are chosen from
//! configuration by factory functions:
//!
//! ```rust,no_run
//! use folio::adapters::blob_store::create_blob_store;
//! use folio::adapters::document_store::create_document_store;
//! use folio::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("folio.toml")?;
//! let documents = create_document_store(&config).await?;
//! let blobs = create_blob_store(&config)?;
//! println!("{} + {}", documents.backend_name(), blobs.backend_name());
//! # Ok(())
//! # }
//! ```

pub mod blob_store;
pub mod cloudinary;
pub mod document_store;
pub mod postgresql;
pub mod staging;
