//! CLI interface and argument parsing
//!
//! This module provides the operator command-line interface for Folio using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Folio - catalog asset lifecycle tool
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
#[command(author = "Folio Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml", env = "FOLIO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FOLIO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Print the store query built from a listing query string
    ComposeQuery(commands::compose_query::ComposeQueryArgs),

    /// Print the storage path for a folder token and role
    DerivePath(commands::derive_path::DerivePathArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["folio", "init"]);
        assert_eq!(cli.config, "folio.toml");
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["folio", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["folio", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_compose_query() {
        let cli = Cli::parse_from([
            "folio",
            "compose-query",
            "page=2&title=dune",
            "--collection",
            "categories",
        ]);
        match cli.command {
            Commands::ComposeQuery(args) => {
                assert_eq!(args.query, "page=2&title=dune");
                assert_eq!(args.collection, "categories");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_derive_path() {
        let cli = Cli::parse_from(["folio", "derive-path", "Folio/Categories", "ab12", "image"]);
        match cli.command {
            Commands::DerivePath(args) => {
                assert_eq!(args.prefix, "Folio/Categories");
                assert_eq!(args.folder_id, "ab12");
                assert_eq!(args.role, "image");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
