//! Asset batches
//!
//! [`BlobBatchUploader`] pushes staged files to the blob store; [`BlobBatchDeleter`]
//! removes descriptors and subtrees best-effort and reports per-item outcomes.

pub mod deleter;
pub mod report;
pub mod uploader;

pub use deleter::BlobBatchDeleter;
pub use report::{BlobOutcome, BlobTarget, CleanupReport, DeletionReport};
pub use uploader::{BlobBatchUploader, UploadOutcome, UploadedAsset};
