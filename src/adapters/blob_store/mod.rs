//! Blob store abstraction and backends
//!
//! Backends:
//! - [`InMemoryBlobStore`] records calls, for tests
//! - [`LocalBlobStore`] writes a directory tree
//! - [`crate::adapters::cloudinary::CloudinaryBlobStore`] talks to the Cloudinary API

pub mod factory;
pub mod local;
pub mod memory;
pub mod traits;

pub use factory::create_blob_store;
pub use local::LocalBlobStore;
pub use memory::{BlobCall, InMemoryBlobStore};
pub use traits::BlobStore;
