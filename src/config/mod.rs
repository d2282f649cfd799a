//! Configuration management for Folio.
//!
//! Folio reads a TOML file (`folio.toml` by default) with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FOLIO_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation of the selected backends only
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use folio::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("folio.toml")?;
//!
//! println!("Storage root: {}", config.blob_store.root_folder);
//! println!("Default page size: {}", config.query.default_page_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DocumentStoreConfig`] / [`PostgreSQLConfig`] - Document store backend
//! - [`BlobStoreConfig`] / [`CloudinaryConfig`] / [`LocalBlobConfig`] - Blob store backend
//! - [`StagingConfig`] - Multipart staging directory and size limit
//! - [`LifecycleConfig`] - Folder token length
//! - [`QueryConfig`] - Page size defaults
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [document_store]
//! backend = "postgresql"
//!
//! [postgresql]
//! connection_string = "${FOLIO_DATABASE_URL}"
//!
//! [blob_store]
//! backend = "cloudinary"
//! root_folder = "Folio"
//!
//! [cloudinary]
//! cloud_name = "my-cloud"
//! api_key = "123456789"
//! api_secret = "${FOLIO_CLOUDINARY_SECRET}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_from_str};
pub use schema::{
    ApplicationConfig, BlobStoreBackend, BlobStoreConfig, CloudinaryConfig, DocumentStoreBackend,
    DocumentStoreConfig, Environment, FolioConfig, LifecycleConfig, LocalBlobConfig,
    LoggingConfig, PostgreSQLConfig, QueryConfig, StagingConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
