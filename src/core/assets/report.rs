//! Outcome reports for best-effort blob cleanup

use crate::domain::{FolderKey, ResourceId};
use serde::Serialize;

/// What a cleanup step targeted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum BlobTarget {
    /// One object by remote id
    Object(String),
    /// Every object below a prefix
    Prefix(FolderKey),
    /// The folder itself
    Folder(FolderKey),
}

impl std::fmt::Display for BlobTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobTarget::Object(id) => write!(f, "object {id}"),
            BlobTarget::Prefix(key) => write!(f, "prefix {key}"),
            BlobTarget::Folder(key) => write!(f, "folder {key}"),
        }
    }
}

/// Result of one best-effort blob call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobOutcome {
    /// Target of the call
    pub target: BlobTarget,
    /// Whether the call succeeded
    pub ok: bool,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BlobOutcome {
    /// Successful call
    pub fn succeeded(target: BlobTarget) -> Self {
        Self {
            target,
            ok: true,
            error: None,
        }
    }

    /// Failed call
    pub fn failed(target: BlobTarget, error: impl ToString) -> Self {
        Self {
            target,
            ok: false,
            error: Some(error.to_string()),
        }
    }
}

/// Non-fatal report of retired assets after an update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// One entry per retire attempt
    pub outcomes: Vec<BlobOutcome>,
}

impl CleanupReport {
    /// Report from outcomes
    pub fn new(outcomes: Vec<BlobOutcome>) -> Self {
        Self { outcomes }
    }

    /// True when every retire attempt succeeded
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.ok)
    }

    /// Failed attempts
    pub fn failures(&self) -> Vec<&BlobOutcome> {
        self.outcomes.iter().filter(|o| !o.ok).collect()
    }
}

/// Result of a delete workflow
///
/// Blob failures never fail the workflow; they are listed here for background cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    /// Deleted resource
    pub resource_id: ResourceId,
    /// Subtree that was removed
    pub folder: FolderKey,
    /// Per-item blob outcomes, in the order they were attempted
    pub outcomes: Vec<BlobOutcome>,
    /// Whether the document was removed
    pub document_removed: bool,
    /// Dependent documents removed along with it
    pub cascaded_documents: u64,
}

impl DeletionReport {
    /// True when every blob call succeeded
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| o.ok)
    }

    /// Failed blob calls
    pub fn failures(&self) -> Vec<&BlobOutcome> {
        self.outcomes.iter().filter(|o| !o.ok).collect()
    }
}
