//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod compose_query;
pub mod derive_path;
pub mod init;
pub mod validate;
