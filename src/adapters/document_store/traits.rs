//! Document store abstraction
//!
//! This module defines the trait that document store adapters must implement to work
//! with Folio, plus the unique indexes every backend enforces.

use crate::core::query::{Filter, RefinedQuery};
use crate::domain::{DocumentStoreError, FolioError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Field holding the document id
pub const ID_FIELD: &str = "_id";

/// Unique indexes as `(collection, field)`
pub const UNIQUE_INDEXES: &[(&str, &str)] = &[
    ("categories", "name"),
    ("categories", "slug"),
    ("categories", "folderId"),
    ("books", "folderId"),
    ("users", "email"),
];

/// Unique fields declared for a collection
pub fn unique_fields(collection: &str) -> impl Iterator<Item = &'static str> + '_ {
    UNIQUE_INDEXES
        .iter()
        .filter(move |(c, _)| *c == collection)
        .map(|(_, f)| *f)
}

/// JSON document storage in named collections
///
/// Documents are JSON objects identified by their `_id` string field. Implementations
/// enforce [`UNIQUE_INDEXES`] and report violations as
/// [`DocumentStoreError::UniqueViolation`], which surfaces as a conflict.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &str;

    /// Find a document by id
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if no document has this id.
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Find the first document matching a filter
    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>>;

    /// Run a refined query (filter, sort, skip, limit)
    async fn find(&self, query: &RefinedQuery) -> Result<Vec<Value>>;

    /// Count documents matching a filter
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Insert a new document
    ///
    /// # Errors
    ///
    /// Returns a conflict if the id or a unique field is already taken.
    async fn create(&self, collection: &str, document: Value) -> Result<Value>;

    /// Replace an existing document
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the document no longer exists.
    async fn replace(&self, collection: &str, id: &str, document: Value)
        -> Result<Option<Value>>;

    /// Delete a document by id
    ///
    /// # Returns
    ///
    /// Returns the deleted document, or `Ok(None)` if it did not exist.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Delete every document matching a filter
    ///
    /// # Returns
    ///
    /// Returns the number of deleted documents.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;
}

/// Serialize a typed document
pub fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(FolioError::from)
}

/// Decode a stored document into a typed value
pub fn decode<T: DeserializeOwned>(collection: &str, document: Value) -> Result<T> {
    serde_json::from_value(document).map_err(|e| {
        DocumentStoreError::DeserializationFailed(format!("{collection}: {e}")).into()
    })
}

/// Extract the `_id` of a document
pub fn document_id(document: &Value) -> Result<&str> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| FolioError::Validation("Document has no '_id' string field".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unique_fields() {
        let fields: Vec<_> = unique_fields("categories").collect();
        assert_eq!(fields, vec!["name", "slug", "folderId"]);
        assert_eq!(unique_fields("reviews").count(), 0);
    }

    #[test]
    fn test_document_id() {
        assert_eq!(document_id(&json!({"_id": "a"})).unwrap(), "a");
        assert!(document_id(&json!({"id": "a"})).is_err());
        assert!(document_id(&json!({"_id": ""})).is_err());
    }

    #[test]
    fn test_decode_error_is_upstream() {
        let err = decode::<u32>("books", json!("x")).unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::UpstreamFailure);
    }
}
