//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Folio configuration file.

use crate::config::load_config;
use crate::config::schema::{BlobStoreBackend, DocumentStoreBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as its last step
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);

        match config.document_store.backend {
            DocumentStoreBackend::Memory => println!("  Document Store: memory"),
            DocumentStoreBackend::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Document Store: PostgreSQL");
                    println!(
                        "  PostgreSQL Connection: {}",
                        connection_target(pg_config.connection_string.expose_secret().as_str())
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
        }

        match config.blob_store.backend {
            BlobStoreBackend::Memory => println!("  Blob Store: memory"),
            BlobStoreBackend::Local => {
                if let Some(ref local) = config.local_blob {
                    println!("  Blob Store: local ({})", local.root_dir);
                }
            }
            BlobStoreBackend::Cloudinary => {
                if let Some(ref cloudinary) = config.cloudinary {
                    println!("  Blob Store: Cloudinary ({})", cloudinary.cloud_name);
                }
            }
        }

        println!("  Root Folder: {}", config.blob_store.root_folder);
        println!("  Staging Directory: {}", config.staging.directory);
        println!("  Folder Token Length: {}", config.lifecycle.folder_id_length);
        println!(
            "  Page Size: {} (max {})",
            config.query.default_page_size, config.query.max_page_size
        );
        println!();
        Ok(0)
    }
}

/// Host part of a connection string, without credentials
fn connection_target(connection_string: &str) -> &str {
    connection_string
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or("***")
}
