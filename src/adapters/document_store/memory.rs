//! In-process document store
//!
//! Evaluates the filter language directly over JSON documents. Used by tests, dry runs
//! and the CLI.

use super::traits::{document_id, unique_fields, DocumentStore, ID_FIELD};
use crate::core::query::filter::{compare, lookup};
use crate::core::query::{Filter, RefinedQuery, SortDirection};
use crate::domain::{DocumentStoreError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type Collection = BTreeMap<String, Value>;

/// Document store keeping every collection in memory
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Whether a collection holds no documents
    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    /// Insert documents without unique checks (fixtures)
    pub async fn seed(&self, collection: &str, documents: impl IntoIterator<Item = Value>) {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        for doc in documents {
            if let Ok(id) = document_id(&doc) {
                docs.insert(id.to_string(), doc);
            }
        }
    }

    fn check_unique(
        collection: &str,
        docs: &Collection,
        id: &str,
        document: &Value,
    ) -> Result<()> {
        for field in unique_fields(collection) {
            let Some(value) = document.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = docs
                .iter()
                .any(|(other_id, other)| other_id != id && other.get(field) == Some(value));
            if taken {
                return Err(DocumentStoreError::UniqueViolation {
                    collection: collection.to_string(),
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn sort_documents(documents: &mut [Value], query: &RefinedQuery) {
    documents.sort_by(|a, b| {
        for (field, direction) in &query.sort.0 {
            let ordering = match (lookup(a, field), lookup(b, field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare(Some(x), y).unwrap_or(Ordering::Equal),
            };
            let ordering = match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id).cloned()))
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.values().find(|d| filter.matches(d)).cloned()))
    }

    async fn find(&self, query: &RefinedQuery) -> Result<Vec<Value>> {
        let mut matching: Vec<Value> = self
            .collections
            .read()
            .await
            .get(&query.collection)
            .map(|docs| {
                docs.values()
                    .filter(|d| query.filter.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_documents(&mut matching, query);

        Ok(matching
            .into_iter()
            .skip(usize::try_from(query.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, |docs| docs.values().filter(|d| filter.matches(d)).count() as u64))
    }

    async fn create(&self, collection: &str, document: Value) -> Result<Value> {
        let id = document_id(&document)?.to_string();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.contains_key(&id) {
            return Err(DocumentStoreError::UniqueViolation {
                collection: collection.to_string(),
                field: ID_FIELD.to_string(),
            }
            .into());
        }
        Self::check_unique(collection, docs, &id, &document)?;

        docs.insert(id, document.clone());
        Ok(document)
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        document: Value,
    ) -> Result<Option<Value>> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        if !docs.contains_key(id) {
            return Ok(None);
        }
        Self::check_unique(collection, docs, id, &document)?;

        docs.insert(id.to_string(), document.clone());
        Ok(Some(document))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .write()
            .await
            .get_mut(collection)
            .and_then(|docs| docs.remove(id)))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|_, d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }
}
