//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - plain or JSON console output
//! - configurable log levels (`RUST_LOG` wins when set)
//! - optional rolling JSON log file
//!
//! # Example
//!
//! ```no_run
//! use folio::logging::init_logging;
//! use folio::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(resource_id = "b1", "Book created");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a workflow state transition at debug level
///
/// # Example
///
/// ```no_run
/// use folio::log_transition;
///
/// log_transition!("create", "Book", "FolderDerived");
/// ```
#[macro_export]
macro_rules! log_transition {
    ($operation:expr, $kind:expr, $state:expr) => {
        tracing::debug!(
            operation = $operation,
            kind = %$kind,
            state = $state,
            "Workflow transition"
        );
    };
    ($operation:expr, $kind:expr, $state:expr, $resource_id:expr) => {
        tracing::debug!(
            operation = $operation,
            kind = %$kind,
            state = $state,
            resource_id = %$resource_id,
            "Workflow transition"
        );
    };
}

/// Log a best-effort cleanup failure at warn level
///
/// # Example
///
/// ```no_run
/// use folio::log_cleanup_failure;
///
/// log_cleanup_failure!("Folio/Categories/ab12/image/x1", "timeout", "compensation");
/// ```
#[macro_export]
macro_rules! log_cleanup_failure {
    ($target:expr, $error:expr, $phase:expr) => {
        tracing::warn!(
            target_key = %$target,
            error = %$error,
            phase = $phase,
            "Best-effort blob cleanup failed"
        );
    };
}
