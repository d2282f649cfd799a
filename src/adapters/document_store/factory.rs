//! Document store factory
//!
//! This module provides the factory function that creates the document store selected
//! in configuration.

use super::memory::InMemoryDocumentStore;
use super::traits::DocumentStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::{DocumentStoreBackend, FolioConfig};
use crate::domain::{FolioError, Result};
use std::sync::Arc;

/// Create a document store based on the configuration
///
/// The PostgreSQL backend checks connectivity and applies the schema before returning.
///
/// # Errors
///
/// Returns an error if the selected backend has no configuration section or cannot be
/// reached.
pub async fn create_document_store(
    config: &FolioConfig,
) -> Result<Arc<dyn DocumentStore + Send + Sync>> {
    match config.document_store.backend {
        DocumentStoreBackend::Memory => {
            tracing::info!("Creating in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()) as Arc<dyn DocumentStore + Send + Sync>)
        }
        DocumentStoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                FolioError::Configuration(
                    "[postgresql] section is required for the postgresql backend".to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL document store");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            client.test_connection().await?;
            client.ensure_schema().await?;

            Ok(Arc::new(PostgreSQLAdapter::new(client)) as Arc<dyn DocumentStore + Send + Sync>)
        }
    }
}
