//! Domain identifier types with validation
//!
//! Newtype wrappers for document ids, user ids, folder tokens and storage prefixes.
//! Each type validates on construction so that an empty id can never reach a store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document identifier
///
/// Generated as a UUID v4 for new documents; any non-empty token is accepted when
/// loading documents written by other systems.
///
/// # Examples
///
/// ```
/// use folio::domain::ids::ResourceId;
/// use std::str::FromStr;
///
/// let id = ResourceId::from_str("65f1c0ffee").unwrap();
/// assert_eq!(id.as_str(), "65f1c0ffee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Creates a ResourceId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Resource ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// User identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a UserId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("User ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short random token naming a resource's private subtree in the blob store
///
/// Only ASCII alphanumerics are accepted so the token is always a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderId(String);

impl FolderId {
    /// Creates a FolderId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Folder ID cannot be empty".to_string());
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(format!(
                "Folder ID must be alphanumeric, got: {id}"
            ));
        }
        Ok(Self(id))
    }

    /// Wraps a token produced by the alphanumeric generator
    pub(crate) fn from_generated(token: String) -> Self {
        debug_assert!(!token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric()));
        Self(token)
    }

    /// Returns the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Hierarchical storage prefix, e.g. `Folio/Categories/ab12/Books/x9k2`
///
/// Never empty, no leading or trailing `/`, no empty segments.
///
/// # Examples
///
/// ```
/// use folio::domain::ids::FolderKey;
///
/// let key = FolderKey::new("Folio/Categories").unwrap();
/// let child = key.child("ab12").unwrap();
/// assert_eq!(child.as_str(), "Folio/Categories/ab12");
/// assert!(key.is_ancestor_of(&child));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderKey(String);

impl FolderKey {
    /// Creates a FolderKey, validating its segments
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.is_empty() {
            return Err("Folder key cannot be empty".to_string());
        }
        if key.split('/').any(|segment| segment.trim().is_empty()) {
            return Err(format!("Folder key has an empty segment: '{key}'"));
        }
        Ok(Self(key))
    }

    /// Appends one segment
    pub fn child(&self, segment: &str) -> Result<Self, String> {
        if segment.is_empty() || segment.contains('/') {
            return Err(format!("Invalid folder key segment: '{segment}'"));
        }
        Ok(Self(format!("{}/{}", self.0, segment)))
    }

    /// Returns the prefix as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Everything before the last segment, if any
    pub fn parent(&self) -> Option<FolderKey> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| FolderKey(parent.to_string()))
    }

    /// True when `other` lies strictly below this prefix
    pub fn is_ancestor_of(&self, other: &FolderKey) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == b'/'
    }

    /// True when the remote id lies below this prefix
    pub fn contains_remote_id(&self, remote_id: &str) -> bool {
        remote_id.len() > self.0.len()
            && remote_id.starts_with(&self.0)
            && remote_id.as_bytes()[self.0.len()] == b'/'
    }
}

macro_rules! string_id_impls {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl TryFrom<String> for $name {
                type Error = String;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::new(value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }
        )*
    };
}

string_id_impls!(ResourceId, UserId, FolderId, FolderKey);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_id_rejects_empty() {
        assert!(ResourceId::new("").is_err());
        assert!(ResourceId::new("   ").is_err());
        assert!(ResourceId::new("abc").is_ok());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(ResourceId::generate(), ResourceId::generate());
    }

    #[test]
    fn test_folder_id_validation() {
        assert!(FolderId::new("a1B2").is_ok());
        assert!(FolderId::new("").is_err());
        assert!(FolderId::new("a/b").is_err());
        assert!(FolderId::new("a-b").is_err());
    }

    #[test]
    fn test_folder_key_validation() {
        assert!(FolderKey::new("").is_err());
        assert!(FolderKey::new("/Folio").is_err());
        assert!(FolderKey::new("Folio/").is_err());
        assert!(FolderKey::new("Folio//Categories").is_err());
        assert!(FolderKey::new("Folio/Categories").is_ok());
    }

    #[test]
    fn test_folder_key_navigation() {
        let key = FolderKey::new("Folio/Categories/ab12").unwrap();
        assert_eq!(key.last_segment(), "ab12");
        assert_eq!(key.parent().unwrap().as_str(), "Folio/Categories");
        assert!(FolderKey::new("Folio").unwrap().parent().is_none());
        assert!(key.child("a/b").is_err());
    }

    #[test]
    fn test_ancestry_requires_segment_boundary() {
        let key = FolderKey::new("Folio/Categories/ab").unwrap();
        let sibling = FolderKey::new("Folio/Categories/abc").unwrap();
        let child = FolderKey::new("Folio/Categories/ab/Books").unwrap();
        assert!(!key.is_ancestor_of(&sibling));
        assert!(key.is_ancestor_of(&child));
        assert!(!key.is_ancestor_of(&key));
        assert!(key.contains_remote_id("Folio/Categories/ab/image/x1"));
        assert!(!key.contains_remote_id("Folio/Categories/abc/image/x1"));
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let key: FolderKey = serde_json::from_str("\"Folio/Categories\"").unwrap();
        assert_eq!(key.as_str(), "Folio/Categories");
        assert!(serde_json::from_str::<FolderId>("\"\"").is_err());
    }
}
