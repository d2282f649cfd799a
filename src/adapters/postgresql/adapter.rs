//! PostgreSQL adapter implementing the document store trait
//!
//! Every collection lives in the single `documents` table keyed by `(collection, id)`,
//! with the document itself in a `jsonb` body.

use super::client::PostgreSQLClient;
use super::sql::{SqlBuilder, SqlParam};
use crate::adapters::document_store::traits::{document_id, DocumentStore};
use crate::core::query::{Filter, RefinedQuery};
use crate::domain::{DocumentStoreError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio_postgres::Row;

/// PostgreSQL implementation of [`DocumentStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn bodies(&self, collection: &str, sql: &str, params: &[SqlParam]) -> Result<Vec<Value>> {
        self.client
            .query(collection, sql, params)
            .await?
            .iter()
            .map(body_of)
            .collect()
    }

    async fn first_body(
        &self,
        collection: &str,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<Value>> {
        Ok(self.bodies(collection, sql, params).await?.into_iter().next())
    }
}

fn body_of(row: &Row) -> Result<Value> {
    row.try_get::<_, Value>("body")
        .map_err(|e| DocumentStoreError::DeserializationFailed(e.to_string()).into())
}

fn by_id(collection: &str, id: &str) -> Vec<SqlParam> {
    vec![
        SqlParam::Text(collection.to_string()),
        SqlParam::Text(id.to_string()),
    ]
}

#[async_trait]
impl DocumentStore for PostgreSQLAdapter {
    fn backend_name(&self) -> &str {
        "postgresql"
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.first_body(
            collection,
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
            &by_id(collection, id),
        )
        .await
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        let mut sql = SqlBuilder::for_collection(collection);
        let predicate = sql.where_clause(filter);
        let statement = format!("SELECT body FROM documents WHERE {predicate} ORDER BY id LIMIT 1");
        self.first_body(collection, &statement, sql.params()).await
    }

    async fn find(&self, query: &RefinedQuery) -> Result<Vec<Value>> {
        let mut sql = SqlBuilder::for_collection(&query.collection);
        let predicate = sql.where_clause(&query.filter);
        let page = sql.page_clause(query);
        let statement = format!("SELECT body FROM documents WHERE {predicate} {page}");

        tracing::debug!(
            collection = %query.collection,
            clauses = query.filter.clauses().len(),
            limit = query.limit,
            skip = query.skip,
            "Running PostgreSQL listing query"
        );
        self.bodies(&query.collection, &statement, sql.params()).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut sql = SqlBuilder::for_collection(collection);
        let predicate = sql.where_clause(filter);
        let statement = format!("SELECT COUNT(*) AS total FROM documents WHERE {predicate}");

        let rows = self.client.query(collection, &statement, sql.params()).await?;
        let total = rows
            .first()
            .map(|row| row.try_get::<_, i64>("total"))
            .transpose()
            .map_err(|e| DocumentStoreError::QueryFailed(e.to_string()))?
            .unwrap_or(0);
        Ok(total.max(0) as u64)
    }

    async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        let id = document_id(&document)?.to_string();
        let mut params = by_id(collection, &id);
        params.push(SqlParam::Json(document.clone()));

        self.client
            .execute(
                collection,
                "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)",
                &params,
                DocumentStoreError::InsertFailed,
            )
            .await?;

        tracing::debug!(collection, id = %id, "Inserted document");
        Ok(document)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>> {
        let mut params = by_id(collection, id);
        params.push(SqlParam::Json(document));

        self.first_body(
            collection,
            "UPDATE documents SET body = $3, stored_at = NOW() \
             WHERE collection = $1 AND id = $2 RETURNING body",
            &params,
        )
        .await
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        self.first_body(
            collection,
            "DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING body",
            &by_id(collection, id),
        )
        .await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut sql = SqlBuilder::for_collection(collection);
        let predicate = sql.where_clause(filter);
        let statement = format!("DELETE FROM documents WHERE {predicate}");

        let removed = self
            .client
            .execute(collection, &statement, sql.params(), DocumentStoreError::DeleteFailed)
            .await?;
        tracing::debug!(collection, removed, "Deleted matching documents");
        Ok(removed)
    }
}
