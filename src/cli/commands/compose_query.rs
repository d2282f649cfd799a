//! Compose-query command implementation
//!
//! Prints the store query a listing request would run, without touching a store.

use crate::config::load_config;
use crate::config::schema::QueryConfig;
use crate::core::query::{BaseQuery, QueryFeatureComposer, RawParams};
use clap::Args;
use std::path::Path;

/// Arguments for the compose-query command
#[derive(Args, Debug)]
pub struct ComposeQueryArgs {
    /// Request query string, e.g. `page=2&sort=title%20asc&pages[gte]=100`
    pub query: String,

    /// Collection the query targets
    #[arg(long, default_value = "books")]
    pub collection: String,
}

impl ComposeQueryArgs {
    /// Execute the compose-query command
    ///
    /// Paging limits come from the configuration file when it exists.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let query_config = if Path::new(config_path).exists() {
            match load_config(config_path) {
                Ok(config) => config.query,
                Err(e) => {
                    println!("❌ Failed to load configuration file");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        } else {
            QueryConfig::default()
        };

        let composer = QueryFeatureComposer::new(&query_config);
        let refined = RawParams::parse(&self.query)
            .and_then(|params| composer.compose(&params, BaseQuery::collection(&self.collection)));

        match refined {
            Ok(query) => {
                tracing::debug!(collection = %self.collection, "Query composed");
                println!("{}", serde_json::to_string_pretty(&query.to_json())?);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Invalid query: {e}");
                Ok(5)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_compose_query_without_config() {
        let args = ComposeQueryArgs {
            query: "page=2&size=5&title=dune".to_string(),
            collection: "books".to_string(),
        };
        let code = args.execute("/nonexistent/folio.toml").await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_compose_query_rejects_bad_operator() {
        let args = ComposeQueryArgs {
            query: "pages[between]=1".to_string(),
            collection: "books".to_string(),
        };
        let code = args.execute("/nonexistent/folio.toml").await.unwrap();
        assert_eq!(code, 5);
    }
}
