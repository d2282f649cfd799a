//! Domain error types
//!
//! This module defines the error hierarchy for Folio. Every error carries a stable
//! [`ErrorKind`] and a human-readable message; store-specific error codes never leak
//! past the adapter that produced them.

use thiserror::Error;

/// Main Folio error type
///
/// This is the primary error type used throughout the crate. Validation, NotFound,
/// Conflict and Forbidden are raised before any destructive action; Upstream wraps a
/// failed call to the document store or the blob store.
#[derive(Debug, Error)]
pub enum FolioError {
    /// Missing required asset, malformed field, rejected upload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Parent or target resource absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate natural key or unique-index violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authorization mismatch
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Blob or document store call failed
    #[error("Upstream failure: {0}")]
    Upstream(#[from] UpstreamError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors (staging directory, local blob tree)
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Stable error kind exposed to the calling layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or missing required asset
    Validation,
    /// Target or parent resource absent
    NotFound,
    /// Duplicate natural key
    Conflict,
    /// Caller not allowed to act on the resource
    Forbidden,
    /// A store call failed
    UpstreamFailure,
    /// Local misconfiguration or I/O trouble
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::UpstreamFailure => "upstream_failure",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FolioError {
    /// Returns the stable kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Validation(_) => ErrorKind::Validation,
            FolioError::NotFound(_) => ErrorKind::NotFound,
            FolioError::Conflict(_) => ErrorKind::Conflict,
            FolioError::Forbidden(_) => ErrorKind::Forbidden,
            FolioError::Upstream(_) => ErrorKind::UpstreamFailure,
            FolioError::Configuration(_) | FolioError::Io(_) | FolioError::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the error was detected before any store mutation could happen
    pub fn is_precondition(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Conflict | ErrorKind::Forbidden
        )
    }
}

/// Failure of an external store call
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Remote object store failure
    #[error("Blob store: {0}")]
    BlobStore(#[from] BlobStoreError),

    /// Document store failure
    #[error("Document store: {0}")]
    DocumentStore(#[from] DocumentStoreError),
}

/// Remote object store errors
///
/// These errors don't expose the HTTP client or filesystem types.
#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// Failed to reach the blob store
    #[error("Failed to connect to blob store: {0}")]
    ConnectionFailed(String),

    /// Upload rejected or interrupted
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Delete of a single object failed
    #[error("Delete failed for '{remote_id}': {message}")]
    DeleteFailed { remote_id: String, message: String },

    /// Prefix or folder removal failed
    #[error("Folder removal failed for '{prefix}': {message}")]
    FolderRemovalFailed { prefix: String, message: String },

    /// Staged file could not be read
    #[error("Staged file unreadable: {0}")]
    LocalFile(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Unexpected response body
    #[error("Invalid response from blob store: {0}")]
    InvalidResponse(String),
}

/// Document store errors
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// Failed to reach the store or obtain a connection
    #[error("Failed to connect to document store: {0}")]
    ConnectionFailed(String),

    /// Unique index violated
    #[error("Unique constraint violated on {collection}.{field}")]
    UniqueViolation { collection: String, field: String },

    /// Failed to insert document
    #[error("Failed to insert document: {0}")]
    InsertFailed(String),

    /// Failed to update document
    #[error("Failed to update document: {0}")]
    UpdateFailed(String),

    /// Failed to delete document
    #[error("Failed to delete document: {0}")]
    DeleteFailed(String),

    /// Failed to query documents
    #[error("Failed to query documents: {0}")]
    QueryFailed(String),

    /// Stored document could not be decoded
    #[error("Failed to deserialize document: {0}")]
    DeserializationFailed(String),
}

impl From<BlobStoreError> for FolioError {
    fn from(err: BlobStoreError) -> Self {
        FolioError::Upstream(UpstreamError::BlobStore(err))
    }
}

// Unique-index violations are conflicts, not upstream failures
impl From<DocumentStoreError> for FolioError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::UniqueViolation { collection, field } => FolioError::Conflict(
                format!("A document in '{collection}' already uses this {field}"),
            ),
            other => FolioError::Upstream(UpstreamError::DocumentStore(other)),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for FolioError {
    fn from(err: std::io::Error) -> Self {
        FolioError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FolioError {
    fn from(err: toml::de::Error) -> Self {
        FolioError::Configuration(format!("TOML parse error: {err}"))
    }
}
