//! Book rate maintenance
//!
//! A book's `rate` is the mean of its reviews' `reviewRate`, rounded to one decimal.

use crate::adapters::document_store::DocumentStore;
use crate::core::query::{Filter, RefinedQuery, SortSpec};
use crate::domain::{FolioError, ResourceId, ResourceKind, Result};
use serde_json::Value;

/// Collection holding reviews
pub const REVIEWS_COLLECTION: &str = "reviews";

const REVIEW_RATE_FIELD: &str = "reviewRate";

/// Mean rounded to one decimal; `0` without rates
pub fn average_rate(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Current rate of a book computed from its reviews
///
/// A failed review read yields `0` and is logged.
pub async fn compute_book_rate(store: &dyn DocumentStore, book_id: &ResourceId) -> f64 {
    let query = match Filter::eq("bookId", book_id.as_str()) {
        Ok(filter) => RefinedQuery {
            collection: REVIEWS_COLLECTION.to_string(),
            filter,
            sort: SortSpec::newest_first(),
            limit: i64::MAX as u64,
            skip: 0,
        },
        Err(e) => {
            tracing::error!(book_id = %book_id, error = %e, "Invalid review filter");
            return 0.0;
        }
    };

    match store.find(&query).await {
        Ok(reviews) => {
            let rates: Vec<f64> = reviews
                .iter()
                .filter_map(|r| r.get(REVIEW_RATE_FIELD).and_then(Value::as_f64))
                .collect();
            average_rate(&rates)
        }
        Err(e) => {
            tracing::error!(book_id = %book_id, error = %e, "Failed to read reviews");
            0.0
        }
    }
}

/// Recompute and store the rate of a book
///
/// # Errors
///
/// Returns `NotFound` if the book does not exist, or an upstream error if the store
/// rejects the write.
pub async fn refresh_book_rate(store: &dyn DocumentStore, book_id: &ResourceId) -> Result<f64> {
    let collection = ResourceKind::Book.collection();
    let Some(mut book) = store.find_by_id(collection, book_id.as_str()).await? else {
        return Err(FolioError::NotFound("Book not found".to_string()));
    };

    let rate = compute_book_rate(store, book_id).await;
    if let Some(fields) = book.as_object_mut() {
        fields.insert("rate".to_string(), Value::from(rate));
    }
    if store
        .replace(collection, book_id.as_str(), book)
        .await?
        .is_none()
    {
        return Err(FolioError::NotFound("Book not found".to_string()));
    }

    tracing::debug!(book_id = %book_id, rate, "Book rate refreshed");
    Ok(rate)
}
