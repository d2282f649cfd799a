//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BlobStoreBackend, DocumentStoreBackend, FolioConfig};
use super::secret::secret_string;
use crate::domain::errors::FolioError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FolioConfig
/// 4. Applies environment variable overrides (FOLIO_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use folio::config::loader::load_config;
///
/// let config = load_config("folio.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FolioConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FolioError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FolioError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Loads configuration from TOML text
///
/// Same pipeline as [`load_config`] without the file access.
///
/// # Errors
///
/// Returns an error if substitution, parsing or validation fails
pub fn load_config_from_str(contents: &str) -> Result<FolioConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FolioConfig = toml::from_str(&contents)
        .map_err(|e| FolioError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        FolioError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FolioError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(FolioError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(val) => val.parse().map(Some).map_err(|_| {
            FolioError::Configuration(format!("Invalid value for {name}: '{val}'"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using FOLIO_* prefix
///
/// Environment variables follow the pattern: FOLIO_<SECTION>_<KEY>
/// For example: FOLIO_BLOB_STORE_BACKEND, FOLIO_QUERY_DEFAULT_PAGE_SIZE
fn apply_env_overrides(config: &mut FolioConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("FOLIO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Backend selection
    if let Ok(val) = std::env::var("FOLIO_DOCUMENT_STORE_BACKEND") {
        config.document_store.backend = match val.as_str() {
            "memory" => DocumentStoreBackend::Memory,
            "postgresql" => DocumentStoreBackend::PostgreSQL,
            other => {
                return Err(FolioError::Configuration(format!(
                    "Invalid FOLIO_DOCUMENT_STORE_BACKEND '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("FOLIO_BLOB_STORE_BACKEND") {
        config.blob_store.backend = match val.as_str() {
            "memory" => BlobStoreBackend::Memory,
            "local" => BlobStoreBackend::Local,
            "cloudinary" => BlobStoreBackend::Cloudinary,
            other => {
                return Err(FolioError::Configuration(format!(
                    "Invalid FOLIO_BLOB_STORE_BACKEND '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("FOLIO_BLOB_STORE_ROOT_FOLDER") {
        config.blob_store.root_folder = val;
    }

    // PostgreSQL overrides (only if PostgreSQL is configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("FOLIO_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(max) = parse_env("FOLIO_POSTGRESQL_MAX_CONNECTIONS")? {
            pg.max_connections = max;
        }
        if let Ok(val) = std::env::var("FOLIO_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Cloudinary overrides (only if Cloudinary is configured)
    if let Some(ref mut cloudinary) = config.cloudinary {
        if let Ok(val) = std::env::var("FOLIO_CLOUDINARY_CLOUD_NAME") {
            cloudinary.cloud_name = val;
        }
        if let Ok(val) = std::env::var("FOLIO_CLOUDINARY_API_KEY") {
            cloudinary.api_key = val;
        }
        if let Ok(val) = std::env::var("FOLIO_CLOUDINARY_API_SECRET") {
            cloudinary.api_secret = secret_string(val);
        }
        if let Ok(val) = std::env::var("FOLIO_CLOUDINARY_BASE_URL") {
            cloudinary.base_url = val;
        }
    }

    if let Some(ref mut local) = config.local_blob {
        if let Ok(val) = std::env::var("FOLIO_LOCAL_BLOB_ROOT_DIR") {
            local.root_dir = val;
        }
    }

    // Staging overrides
    if let Ok(val) = std::env::var("FOLIO_STAGING_DIRECTORY") {
        config.staging.directory = val;
    }
    if let Some(size) = parse_env("FOLIO_STAGING_MAX_FILE_SIZE_BYTES")? {
        config.staging.max_file_size_bytes = size;
    }

    // Lifecycle and query overrides
    if let Some(len) = parse_env("FOLIO_LIFECYCLE_FOLDER_ID_LENGTH")? {
        config.lifecycle.folder_id_length = len;
    }
    if let Some(size) = parse_env("FOLIO_QUERY_DEFAULT_PAGE_SIZE")? {
        config.query.default_page_size = size;
    }
    if let Some(size) = parse_env("FOLIO_QUERY_MAX_PAGE_SIZE")? {
        config.query.max_page_size = size;
    }

    // Logging overrides
    if let Some(enabled) = parse_env("FOLIO_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("FOLIO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(json) = parse_env("FOLIO_LOGGING_JSON_CONSOLE")? {
        config.logging.json_console = json;
    }

    Ok(())
}
