//! PostgreSQL client implementation
//!
//! Pooled connections (deadpool) with a per-statement timeout. Driver errors are mapped
//! to [`DocumentStoreError`]; unique-index violations keep the violated field.

use super::sql::SqlParam;
use crate::adapters::document_store::traits::{ID_FIELD, UNIQUE_INDEXES};
use crate::config::schema::PostgreSQLConfig;
use crate::domain::{DocumentStoreError, FolioError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for Folio
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// `ssl_mode = "disable"` connects in plain text; any other mode negotiates TLS with
    /// the platform's native TLS stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_str()
            .parse()
            .map_err(|e| {
                FolioError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            let connector = native_tls::TlsConnector::builder().build().map_err(|e| {
                FolioError::Configuration(format!("Failed to build TLS connector: {}", e))
            })?;
            Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                DocumentStoreError::ConnectionFailed(format!(
                    "Failed to create connection pool: {}",
                    e
                ))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client.query_one("SELECT 1", &[]).await.map_err(|e| {
            DocumentStoreError::ConnectionFailed(format!("Connection test failed: {}", e))
        })?;

        tracing::info!(target_db = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Create the documents table and its indexes if they don't exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        let migration_sql = include_str!("../../../migrations/001_documents.sql");

        client.batch_execute(migration_sql).await.map_err(|e| {
            DocumentStoreError::QueryFailed(format!("Failed to execute migration: {}", e))
        })?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            DocumentStoreError::ConnectionFailed(format!(
                "Failed to get connection from pool: {}",
                e
            ))
            .into()
        })
    }

    async fn prepared_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.get_connection().await?;
        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.execute(&timeout_query, &[]).await.map_err(|e| {
            DocumentStoreError::ConnectionFailed(format!("Failed to set statement timeout: {}", e))
        })?;
        Ok(client)
    }

    /// Run a query and return its rows
    pub async fn query(&self, collection: &str, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        let client = self.prepared_connection().await?;
        let refs: Vec<_> = params.iter().map(SqlParam::as_sql).collect();
        client
            .query(sql, &refs)
            .await
            .map_err(|e| map_pg_error(collection, e, DocumentStoreError::QueryFailed))
    }

    /// Run a statement and return the number of affected rows
    pub async fn execute(
        &self,
        collection: &str,
        sql: &str,
        params: &[SqlParam],
        on_error: fn(String) -> DocumentStoreError,
    ) -> Result<u64> {
        let client = self.prepared_connection().await?;
        let refs: Vec<_> = params.iter().map(SqlParam::as_sql).collect();
        client
            .execute(sql, &refs)
            .await
            .map_err(|e| map_pg_error(collection, e, on_error))
    }

    /// Connection string with credentials redacted
    pub fn connection_string_safe(&self) -> String {
        redact(self.config.connection_string.expose_secret().as_str())
    }
}

fn redact(connection_string: &str) -> String {
    connection_string
        .rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{}", host))
        .unwrap_or_else(|| "postgresql://***".to_string())
}

/// Map a driver error; unique violations name the violated field
fn map_pg_error(
    collection: &str,
    err: tokio_postgres::Error,
    fallback: fn(String) -> DocumentStoreError,
) -> FolioError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        let constraint = err
            .as_db_error()
            .and_then(|db| db.constraint())
            .unwrap_or_default();
        return DocumentStoreError::UniqueViolation {
            collection: collection.to_string(),
            field: field_for_constraint(constraint),
        }
        .into();
    }
    fallback(err.to_string()).into()
}

fn field_for_constraint(constraint: &str) -> String {
    if constraint == "documents_pkey" {
        return ID_FIELD.to_string();
    }
    UNIQUE_INDEXES
        .iter()
        .find(|(collection, field)| {
            constraint.eq_ignore_ascii_case(&format!("uq_{collection}_{field}"))
        })
        .map(|(_, field)| field.to_string())
        .unwrap_or_else(|| constraint.to_string())
}
