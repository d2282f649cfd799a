//! In-process blob store
//!
//! Keeps object metadata in memory and records every call, so tests can assert on what
//! was uploaded and deleted.

use super::traits::BlobStore;
use crate::domain::{AssetDescriptor, BlobKind, BlobStoreError, FolderKey, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tokio::sync::Mutex;

/// Call made against an [`InMemoryBlobStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobCall {
    /// Upload below a prefix
    Upload { prefix: String, kind: BlobKind },
    /// Single object delete
    Delete { remote_id: String, kind: BlobKind },
    /// Prefix delete
    DeleteByPrefix(String),
    /// Folder delete
    DeleteFolder(String),
}

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, BlobKind>,
    folders: BTreeSet<String>,
    calls: Vec<BlobCall>,
    next: u64,
}

/// Blob store keeping objects in memory
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    state: Mutex<State>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote ids currently stored
    pub async fn objects(&self) -> Vec<String> {
        self.state.lock().await.objects.keys().cloned().collect()
    }

    /// Whether an object exists
    pub async fn contains(&self, remote_id: &str) -> bool {
        self.state.lock().await.objects.contains_key(remote_id)
    }

    /// Folders that still exist
    pub async fn folders(&self) -> Vec<String> {
        self.state.lock().await.folders.iter().cloned().collect()
    }

    /// Every call in order
    pub async fn calls(&self) -> Vec<BlobCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of upload calls
    pub async fn upload_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, BlobCall::Upload { .. }))
            .count()
    }

    /// Remote ids passed to single-object deletes
    pub async fn deleted_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                BlobCall::Delete { remote_id, .. } => Some(remote_id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn upload(
        &self,
        local_path: &Path,
        dest_prefix: &FolderKey,
        kind: BlobKind,
    ) -> Result<AssetDescriptor> {
        if !tokio::fs::try_exists(local_path).await.unwrap_or(false) {
            return Err(BlobStoreError::LocalFile(local_path.display().to_string()).into());
        }

        let mut state = self.state.lock().await;
        state.calls.push(BlobCall::Upload {
            prefix: dest_prefix.to_string(),
            kind,
        });
        state.next += 1;
        let remote_id = format!("{}/obj{:04}", dest_prefix, state.next);
        state.objects.insert(remote_id.clone(), kind);
        state.folders.insert(dest_prefix.to_string());

        let url = format!("memory://{}/{}", kind.as_str(), remote_id);
        Ok(AssetDescriptor::new(remote_id, url))
    }

    async fn delete(&self, remote_id: &str, kind: BlobKind) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(BlobCall::Delete {
            remote_id: remote_id.to_string(),
            kind,
        });
        state.objects.remove(remote_id);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &FolderKey) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(BlobCall::DeleteByPrefix(prefix.to_string()));
        state.objects.retain(|id, _| !prefix.contains_remote_id(id));
        Ok(())
    }

    async fn delete_folder(&self, prefix: &FolderKey) -> Result<()> {
        let mut state = self.state.lock().await;
        state.calls.push(BlobCall::DeleteFolder(prefix.to_string()));
        state
            .folders
            .retain(|f| f != prefix.as_str() && !prefix.contains_remote_id(f));
        Ok(())
    }
}
