//! Listing queries built from untyped request parameters

pub mod composer;
pub mod filter;
pub mod params;

pub use composer::{
    query_resources, BaseQuery, QueryFeatureComposer, RefinedQuery, SortDirection, SortSpec,
};
pub use filter::{rewrite_operators, Clause, Filter, Operator};
pub use params::RawParams;
