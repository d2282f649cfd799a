//! Asset slots, descriptors and staged uploads
//!
//! A resource's binary assets live in the remote object store; the document only keeps
//! [`AssetDescriptor`]s grouped by [`SlotName`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Handle into the blob store plus a dereferenceable location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Opaque remote identifier (`public_id` on the remote service)
    #[serde(rename = "public_id")]
    pub remote_id: String,
    /// Dereferenceable location (`secure_url` on the remote service)
    #[serde(rename = "secure_url")]
    pub url: String,
}

impl AssetDescriptor {
    /// Create a new descriptor
    pub fn new(remote_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            url: url.into(),
        }
    }
}

/// Resource type of a remote object, as the blob store distinguishes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    /// Images (transformable)
    Image,
    /// Anything else (pdf, docx, ...)
    Raw,
}

impl BlobKind {
    /// Name used in remote API paths
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobKind::Image => "image",
            BlobKind::Raw => "raw",
        }
    }
}

/// Named asset role on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotName {
    /// Category image
    #[serde(rename = "image")]
    Image,
    /// Book cover image
    #[serde(rename = "coverImage")]
    Cover,
    /// Book document (pdf)
    #[serde(rename = "pdf")]
    Document,
    /// Book gallery images
    #[serde(rename = "images")]
    Gallery,
}

impl SlotName {
    /// Multipart field name the slot is staged under
    pub fn field_name(&self) -> &'static str {
        match self {
            SlotName::Image => "image",
            SlotName::Cover => "coverImage",
            SlotName::Document => "pdf",
            SlotName::Gallery => "images",
        }
    }

    /// Trailing storage path segment for the slot
    pub fn role_segment(&self) -> &'static str {
        match self {
            SlotName::Image => "image",
            SlotName::Cover => "cover",
            SlotName::Document => "document",
            SlotName::Gallery => "gallery",
        }
    }

    /// Whether the slot holds a sequence of descriptors
    pub fn is_sequence(&self) -> bool {
        matches!(self, SlotName::Gallery)
    }

    /// Remote resource type of the slot's objects
    pub fn blob_kind(&self) -> BlobKind {
        match self {
            SlotName::Document => BlobKind::Raw,
            _ => BlobKind::Image,
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for SlotName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(SlotName::Image),
            "coverImage" | "cover" => Ok(SlotName::Cover),
            "pdf" | "document" => Ok(SlotName::Document),
            "images" | "gallery" => Ok(SlotName::Gallery),
            other => Err(format!("Unexpected field: {other}")),
        }
    }
}

/// Which files a slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// `.png .jpg .jpeg .gif .webp`
    Image,
    /// `.pdf .doc .docx .txt`
    Document,
}

impl FileClass {
    /// Allowed lowercase extensions, dot included
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileClass::Image => &[".png", ".jpg", ".jpeg", ".gif", ".webp"],
            FileClass::Document => &[".pdf", ".doc", ".docx", ".txt"],
        }
    }

    /// Check a file name against the allow-list (case-insensitive)
    pub fn accepts(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        match lower.rfind('.') {
            Some(idx) => self.extensions().contains(&&lower[idx..]),
            None => false,
        }
    }
}

/// Declaration of one slot on a resource kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    /// Slot name
    pub name: SlotName,
    /// Must be non-empty whenever the resource exists
    pub required: bool,
    /// Maximum number of staged files per request
    pub max_items: usize,
    /// Accepted file class
    pub file_class: FileClass,
}

/// Value held by one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    /// Single descriptor (image, cover, document)
    Single(AssetDescriptor),
    /// Ordered descriptors (gallery)
    Sequence(Vec<AssetDescriptor>),
}

impl SlotValue {
    /// All descriptors held by the value
    pub fn descriptors(&self) -> Vec<&AssetDescriptor> {
        match self {
            SlotValue::Single(d) => vec![d],
            SlotValue::Sequence(ds) => ds.iter().collect(),
        }
    }

    /// True for an empty sequence
    pub fn is_empty(&self) -> bool {
        matches!(self, SlotValue::Sequence(ds) if ds.is_empty())
    }
}

/// Slot values of one resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetSlots(BTreeMap<SlotName, SlotValue>);

impl AssetSlots {
    /// Empty slot set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set a slot
    pub fn insert(&mut self, slot: SlotName, value: SlotValue) {
        self.0.insert(slot, value);
    }

    /// Get a slot
    pub fn get(&self, slot: SlotName) -> Option<&SlotValue> {
        self.0.get(&slot)
    }

    /// Single descriptor of a slot, if it holds one
    pub fn single(&self, slot: SlotName) -> Option<&AssetDescriptor> {
        match self.0.get(&slot) {
            Some(SlotValue::Single(d)) => Some(d),
            _ => None,
        }
    }

    /// Sequence of a slot, empty if absent
    pub fn sequence(&self, slot: SlotName) -> Vec<AssetDescriptor> {
        match self.0.get(&slot) {
            Some(SlotValue::Sequence(ds)) => ds.clone(),
            Some(SlotValue::Single(d)) => vec![d.clone()],
            None => Vec::new(),
        }
    }

    /// Every descriptor, slot by slot
    pub fn descriptors(&self) -> Vec<(SlotName, AssetDescriptor)> {
        self.0
            .iter()
            .flat_map(|(slot, value)| {
                value
                    .descriptors()
                    .into_iter()
                    .map(move |d| (*slot, d.clone()))
            })
            .collect()
    }

    /// Iterate slots in name order
    pub fn iter(&self) -> impl Iterator<Item = (&SlotName, &SlotValue)> {
        self.0.iter()
    }
}

/// A file staged on local disk for the duration of one request
///
/// Dropping the guard removes the file if it has not been released yet, so a staged
/// file never outlives the request that created it.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    /// Take ownership of a file already written to disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            released: false,
        }
    }

    /// Local path of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged file"
                );
            }
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged file on drop"
                );
            }
        }
    }
}

/// One pending upload
#[derive(Debug)]
pub struct StagedUpload {
    /// Target slot
    pub slot: SlotName,
    /// Staged local file
    pub file: StagedFile,
    /// Remote id of the sequence item this upload replaces
    pub replaces: Option<String>,
}

impl StagedUpload {
    /// Upload for a slot
    pub fn new(slot: SlotName, path: impl Into<PathBuf>) -> Self {
        Self {
            slot,
            file: StagedFile::new(path),
            replaces: None,
        }
    }

    /// Mark the upload as replacing an existing sequence item
    pub fn replacing(mut self, remote_id: impl Into<String>) -> Self {
        self.replaces = Some(remote_id.into());
        self
    }
}

/// Request-scoped list of pending uploads
#[derive(Debug, Default)]
pub struct UploadBatch {
    items: Vec<StagedUpload>,
}

impl UploadBatch {
    /// Create a batch
    pub fn new(items: Vec<StagedUpload>) -> Self {
        Self { items }
    }

    /// Batch with no files
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add one upload
    pub fn push(&mut self, upload: StagedUpload) {
        self.items.push(upload);
    }

    /// Whether the batch has no files
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of staged files
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Pending uploads
    pub fn items(&self) -> &[StagedUpload] {
        &self.items
    }

    /// Number of files staged for a slot
    pub fn count_for(&self, slot: SlotName) -> usize {
        self.items.iter().filter(|u| u.slot == slot).count()
    }

    /// Whether any file is staged for a slot
    pub fn has_slot(&self, slot: SlotName) -> bool {
        self.count_for(slot) > 0
    }

    /// Consume the batch
    pub fn into_items(self) -> Vec<StagedUpload> {
        self.items
    }
}
