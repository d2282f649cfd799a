//! Domain models and types for Folio.
//!
//! This module contains the core domain models, types, and business rules for Folio.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ResourceId`], [`UserId`], [`FolderId`], [`FolderKey`])
//! - **Resources** ([`Category`], [`Book`]) and the [`CompositeResource`] trait
//! - **Assets** ([`AssetDescriptor`], [`SlotName`], [`UploadBatch`])
//! - **Caller identity** ([`AuthContext`], [`Role`])
//! - **Error types** ([`FolioError`], [`BlobStoreError`], [`DocumentStoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes validated at construction, so an empty folder key can never
//! reach the blob store:
//!
//! ```rust
//! use folio::domain::{FolderId, FolderKey};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let root = FolderKey::new("Folio/Categories")?;
//! let folder = FolderId::new("ab12")?;
//! let subtree = root.child(folder.as_str())?;
//!
//! assert!(FolderKey::new("").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FolioError>`]; each error maps to a stable
//! [`ErrorKind`]:
//!
//! ```rust
//! use folio::domain::{ErrorKind, FolioError};
//!
//! let err = FolioError::Forbidden("not the creator".to_string());
//! assert_eq!(err.kind(), ErrorKind::Forbidden);
//! ```

pub mod asset;
pub mod auth;
pub mod errors;
pub mod ids;
pub mod resource;
pub mod result;

// Re-export commonly used types for convenience
pub use asset::{
    AssetDescriptor, AssetSlots, BlobKind, FileClass, SlotName, SlotSpec, SlotValue,
    StagedFile, StagedUpload, UploadBatch,
};
pub use auth::{AuthContext, Role};
pub use errors::{BlobStoreError, DocumentStoreError, ErrorKind, FolioError, UpstreamError};
pub use ids::{FolderId, FolderKey, ResourceId, UserId};
pub use resource::{
    Book, BookDraft, BookPatch, Category, CategoryDraft, CategoryPatch, CompositeResource,
    ResourceKind,
};
pub use result::Result;
