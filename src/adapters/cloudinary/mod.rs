//! Cloudinary media API integration
//!
//! Provides [`CloudinaryBlobStore`], the production [`crate::adapters::blob_store::BlobStore`].

pub mod client;
pub mod signature;

pub use client::CloudinaryBlobStore;
