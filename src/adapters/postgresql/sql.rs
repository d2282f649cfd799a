//! Translation of the filter language to parameterised SQL over `jsonb` bodies
//!
//! Field paths and operands are always bound as parameters; only the operator shape is
//! part of the statement text.

use crate::core::query::{Clause, Filter, Operator, RefinedQuery, SortDirection};
use serde_json::Value;
use tokio_postgres::types::ToSql;

/// A bound statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Text value
    Text(String),
    /// `text[]` path into the body
    Path(Vec<String>),
    /// `jsonb` value
    Json(Value),
    /// `bigint` value
    Int(i64),
}

impl SqlParam {
    /// Borrow as a driver parameter
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlParam::Text(v) => v,
            SqlParam::Path(v) => v,
            SqlParam::Json(v) => v,
            SqlParam::Int(v) => v,
        }
    }
}

/// Statement text plus its parameters
#[derive(Debug, Default)]
pub struct SqlBuilder {
    params: Vec<SqlParam>,
}

impl SqlBuilder {
    /// Builder whose first parameter is the collection name (`$1`)
    pub fn for_collection(collection: &str) -> Self {
        Self {
            params: vec![SqlParam::Text(collection.to_string())],
        }
    }

    /// Bind a parameter and return its placeholder
    pub fn bind(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    /// Bound parameters
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// `WHERE` predicate for a filter (always starts with the collection match)
    pub fn where_clause(&mut self, filter: &Filter) -> String {
        let mut predicates = vec!["collection = $1".to_string()];
        for clause in filter.clauses() {
            predicates.push(self.predicate(clause));
        }
        predicates.join(" AND ")
    }

    fn predicate(&mut self, clause: &Clause) -> String {
        let path = self.bind(SqlParam::Path(
            clause.field.split('.').map(str::to_string).collect(),
        ));
        let field = format!("(body #> {path}::text[])");

        if clause.op == Operator::Regex {
            let pattern = self.bind(SqlParam::Text(
                clause.value.as_str().unwrap_or_default().to_string(),
            ));
            let op = if clause.case_insensitive { "~*" } else { "~" };
            return format!("((body #>> {path}::text[]) {op} {pattern})");
        }

        let value = self.bind(SqlParam::Json(clause.value.clone()));
        match clause.op {
            Operator::Eq => format!("({field} = {value}::jsonb)"),
            Operator::Ne => format!("({field} IS DISTINCT FROM {value}::jsonb)"),
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
                let op = match clause.op {
                    Operator::Gt => ">",
                    Operator::Gte => ">=",
                    Operator::Lt => "<",
                    _ => "<=",
                };
                format!(
                    "(jsonb_typeof({field}) = jsonb_typeof({value}::jsonb) AND {field} {op} {value}::jsonb)"
                )
            }
            Operator::In => format!("({value}::jsonb @> jsonb_build_array({field}))"),
            Operator::Nin => format!("(NOT ({value}::jsonb @> jsonb_build_array({field})))"),
            Operator::Regex => unreachable!("handled above"),
        }
    }

    /// `ORDER BY ... LIMIT ... OFFSET ...` suffix for a refined query
    pub fn page_clause(&mut self, query: &RefinedQuery) -> String {
        let mut order = Vec::new();
        for (field, direction) in &query.sort.0 {
            let path = self.bind(SqlParam::Path(
                field.split('.').map(str::to_string).collect(),
            ));
            let dir = match direction {
                SortDirection::Asc => "ASC NULLS FIRST",
                SortDirection::Desc => "DESC NULLS LAST",
            };
            order.push(format!("(body #> {path}::text[]) {dir}"));
        }
        order.push("id ASC".to_string());

        // bigint bounds; anything larger means "no limit" or "past the end"
        let limit = self.bind(SqlParam::Int(i64::try_from(query.limit).unwrap_or(i64::MAX)));
        let offset = self.bind(SqlParam::Int(i64::try_from(query.skip).unwrap_or(i64::MAX)));
        format!("ORDER BY {} LIMIT {limit} OFFSET {offset}", order.join(", "))
    }
}
