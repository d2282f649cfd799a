//! Document store abstraction and backends
//!
//! Resources are stored as JSON documents in named collections. Backends:
//! - [`InMemoryDocumentStore`] for tests and dry runs
//! - [`crate::adapters::postgresql::PostgreSQLAdapter`] over a `jsonb` table

pub mod factory;
pub mod memory;
pub mod traits;

pub use factory::create_document_store;
pub use memory::InMemoryDocumentStore;
pub use traits::{decode, document_id, encode, DocumentStore, ID_FIELD, UNIQUE_INDEXES};
