//! Storage path derivation
//!
//! Every resource owns a private subtree in the blob store:
//!
//! ```text
//! <root>/Categories/<category folderId>/<role>
//! <root>/Categories/<category folderId>/Books/<book folderId>/<role>
//! ```
//!
//! Derivation is pure; the same inputs always give the same key, so an update can
//! re-derive a slot prefix without reading back the original upload response.

use crate::domain::{CompositeResource, FolderId, FolderKey, FolioError, Result, SlotName};
use rand::distributions::Alphanumeric;
use rand::Rng;

const CATEGORIES_SEGMENT: &str = "Categories";
const BOOKS_SEGMENT: &str = "Books";

/// Generate a random alphanumeric folder token
pub fn generate_folder_id(length: usize) -> FolderId {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length.max(1))
        .map(char::from)
        .collect();
    FolderId::from_generated(token)
}

/// Computes storage prefixes below a fixed root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderKeyDeriver {
    root: FolderKey,
}

impl FolderKeyDeriver {
    /// Create a deriver for a root folder such as `Folio`
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty or malformed root.
    pub fn new(root: &str) -> Result<Self> {
        let root = FolderKey::new(root).map_err(FolioError::Configuration)?;
        Ok(Self { root })
    }

    /// Root folder
    pub fn root(&self) -> &FolderKey {
        &self.root
    }

    /// `parent/folder_id/role`
    pub fn derive(&self, parent: &FolderKey, folder_id: &FolderId, role: &str) -> Result<FolderKey> {
        parent
            .child(folder_id.as_str())
            .and_then(|own| own.child(role))
            .map_err(FolioError::Validation)
    }

    /// `<root>/Categories`
    pub fn categories_root(&self) -> Result<FolderKey> {
        self.root
            .child(CATEGORIES_SEGMENT)
            .map_err(FolioError::Validation)
    }

    /// `<root>/Categories/<category>/Books`
    pub fn books_root(&self, category_folder: &FolderId) -> Result<FolderKey> {
        self.derive(&self.categories_root()?, category_folder, BOOKS_SEGMENT)
    }

    /// Subtree of a category
    pub fn category_subtree(&self, folder_id: &FolderId) -> Result<FolderKey> {
        self.categories_root()?
            .child(folder_id.as_str())
            .map_err(FolioError::Validation)
    }

    /// Subtree of a book nested in its category
    pub fn book_subtree(&self, category_folder: &FolderId, folder_id: &FolderId) -> Result<FolderKey> {
        self.books_root(category_folder)?
            .child(folder_id.as_str())
            .map_err(FolioError::Validation)
    }

    /// Subtree of any composite resource
    pub fn subtree_of<R: CompositeResource>(&self, resource: &R) -> Result<FolderKey> {
        match resource.parent_folder_id() {
            Some(parent) => self.book_subtree(parent, resource.folder_id()),
            None => self.category_subtree(resource.folder_id()),
        }
    }

    /// Upload prefix of one slot inside a subtree
    pub fn slot_prefix(&self, subtree: &FolderKey, slot: SlotName) -> Result<FolderKey> {
        subtree
            .child(slot.role_segment())
            .map_err(FolioError::Validation)
    }
}
