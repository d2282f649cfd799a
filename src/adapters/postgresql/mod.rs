//! PostgreSQL document store
//!
//! Documents of every collection share one `jsonb` table; the unique indexes live in
//! `migrations/001_documents.sql`.

pub mod adapter;
pub mod client;
pub mod sql;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
