//! Workflow results
//!
//! Each result carries the derived folder key explicitly, so cleanup steps never have
//! to recover it from shared request state.

use crate::core::assets::CleanupReport;
use crate::domain::FolderKey;
use serde::Serialize;

/// A persisted new resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Created<R> {
    /// Stored resource
    pub resource: R,
    /// Subtree its assets were uploaded to
    pub folder: FolderKey,
}

/// A persisted update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Updated<R> {
    /// Stored resource
    pub resource: R,
    /// Subtree of the resource
    pub folder: FolderKey,
    /// Retirement of replaced assets
    pub cleanup: CleanupReport,
}
