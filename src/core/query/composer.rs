//! Query Feature Composer
//!
//! Turns [`RawParams`] and a base query into a [`RefinedQuery`]: pagination, sort,
//! allow-listed search and the operator filter interpreter.

use super::filter::{Clause, Filter, Operator};
use super::params::{coerce_scalar, RawParams};
use crate::adapters::document_store::DocumentStore;
use crate::config::QueryConfig;
use crate::domain::{FolioError, ResourceKind, Result};
use serde_json::{json, Map, Value};

/// Field creation time is recorded under
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending (`+1`)
    Asc,
    /// Descending (`-1`)
    Desc,
}

impl SortDirection {
    /// Native numeric form
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Ordered sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(pub Vec<(String, SortDirection)>);

impl SortSpec {
    /// Newest first
    pub fn newest_first() -> Self {
        Self(vec![(CREATED_AT_FIELD.to_string(), SortDirection::Desc)])
    }

    /// Parse `"field direction"` (`asc`/`desc`, `1`/`-1`; missing direction is ascending)
    ///
    /// An absent or blank expression sorts newest first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown direction or an invalid field.
    pub fn parse(expression: Option<&str>) -> Result<Self> {
        let Some(expression) = expression.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Self::newest_first());
        };

        let mut parts = expression
            .split(|c: char| c.is_whitespace() || c == ':')
            .filter(|s| !s.is_empty());
        let field = parts.next().unwrap_or_default();
        let direction = match parts.next() {
            None | Some("asc") | Some("1") => SortDirection::Asc,
            Some("desc") | Some("-1") => SortDirection::Desc,
            Some(other) => {
                return Err(FolioError::Validation(format!(
                    "Invalid sort direction '{other}'. Use asc or desc"
                )))
            }
        };
        if parts.next().is_some() {
            return Err(FolioError::Validation(format!(
                "Invalid sort expression '{expression}'"
            )));
        }
        // reuse the filter field rules
        Clause::new(field, Operator::Eq, Value::Null)?;

        Ok(Self(vec![(field.to_string(), direction)]))
    }

    /// Native `{"field": 1|-1}` form
    pub fn to_store_document(&self) -> Value {
        let mut map = Map::new();
        for (field, direction) in &self.0 {
            map.insert(field.clone(), json!(direction.as_i32()));
        }
        Value::Object(map)
    }
}

/// Collection plus a pre-applied filter (e.g. books of one category)
#[derive(Debug, Clone, PartialEq)]
pub struct BaseQuery {
    /// Target collection
    pub collection: String,
    /// Filter applied before any request parameter
    pub filter: Filter,
}

impl BaseQuery {
    /// Every document of a resource kind
    pub fn of(kind: ResourceKind) -> Self {
        Self::collection(kind.collection())
    }

    /// Every document of a collection
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_string(),
            filter: Filter::all(),
        }
    }

    /// Narrow the base filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = self.filter.and(filter);
        self
    }
}

/// Query ready to run against a document store
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedQuery {
    /// Target collection
    pub collection: String,
    /// Conjunctive filter
    pub filter: Filter,
    /// Sort keys
    pub sort: SortSpec,
    /// Page size
    pub limit: u64,
    /// Documents to skip
    pub skip: u64,
}

impl RefinedQuery {
    /// JSON rendering with the native filter and sort forms
    pub fn to_json(&self) -> Value {
        json!({
            "collection": self.collection,
            "filter": self.filter.to_store_document(),
            "sort": self.sort.to_store_document(),
            "limit": self.limit,
            "skip": self.skip,
        })
    }
}

/// Builds refined queries from request parameters
#[derive(Debug, Clone)]
pub struct QueryFeatureComposer {
    default_page_size: u64,
    max_page_size: u64,
}

impl Default for QueryFeatureComposer {
    fn default() -> Self {
        Self::new(&QueryConfig::default())
    }
}

impl QueryFeatureComposer {
    /// Create a composer from configuration
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            default_page_size: config.default_page_size,
            max_page_size: config.max_page_size,
        }
    }

    /// `(limit, skip)` for a requested page and size
    ///
    /// Missing or non-positive page means page 1; missing or non-positive size means the
    /// default; sizes above the maximum are clamped.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the page lies beyond the largest offset a store
    /// accepts (`i64::MAX`).
    pub fn paginate(&self, page: Option<i64>, size: Option<i64>) -> Result<(u64, u64)> {
        let limit = match size {
            Some(s) if s > 0 => (s as u64).min(self.max_page_size),
            _ => self.default_page_size,
        };
        let page = page.filter(|p| *p >= 1).unwrap_or(1) as u64;
        let skip = (page - 1)
            .checked_mul(limit)
            .filter(|skip| *skip <= i64::MAX as u64)
            .ok_or_else(|| FolioError::Validation(format!("Page {page} is out of range")))?;
        Ok((limit, skip))
    }

    /// Search fields matched by case-insensitive substring for a collection
    pub fn search_fields(collection: &str) -> &'static [&'static str] {
        match collection {
            "books" => &["title", "description", "language", "releaseDate"],
            "categories" => &["name"],
            _ => &[],
        }
    }

    /// Compose a refined query
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid sort, an unknown operator or a rejected
    /// field name.
    pub fn compose(&self, params: &RawParams, base: BaseQuery) -> Result<RefinedQuery> {
        let (limit, skip) = self.paginate(params.page, params.size)?;
        let sort = SortSpec::parse(params.sort.as_deref())?;

        let search_fields = Self::search_fields(&base.collection);
        let mut filter = base.filter;

        for (field, value) in &params.fields {
            let clause = if field == "id" {
                Clause::new("_id", Operator::Eq, Value::String(value.clone()))?
            } else if search_fields.contains(&field.as_str()) {
                Clause::contains_ignore_case(field.as_str(), value)?
            } else {
                Clause::new(field.as_str(), Operator::Eq, coerce_scalar(value))?
            };
            filter = filter.with(clause);
        }

        for (field, ops) in &params.conditions {
            for (op, value) in ops {
                filter = filter.with(Clause::new(field.as_str(), *op, value.clone())?);
            }
        }

        tracing::debug!(
            collection = %base.collection,
            limit,
            skip,
            clauses = filter.clauses().len(),
            "Composed query"
        );

        Ok(RefinedQuery {
            collection: base.collection,
            filter,
            sort,
            limit,
            skip,
        })
    }
}

/// Compose and run a listing query
///
/// # Errors
///
/// Returns a validation error from composition or the store's upstream failure.
pub async fn query_resources(
    store: &dyn DocumentStore,
    composer: &QueryFeatureComposer,
    params: &RawParams,
    base: BaseQuery,
) -> Result<Vec<Value>> {
    let query = composer.compose(params, base)?;
    store.find(&query).await
}
