//! Catalog resources
//!
//! A resource is a document plus the remote assets it references. Categories own a
//! single image; books own a cover, a document and an optional gallery and live in
//! their category's storage subtree.

use super::asset::{AssetDescriptor, AssetSlots, FileClass, SlotName, SlotSpec, SlotValue};
use super::auth::Role;
use super::ids::{FolderId, ResourceId, UserId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of gallery images per request
pub const MAX_GALLERY_ITEMS: usize = 10;

const CATEGORY_SLOTS: &[SlotSpec] = &[SlotSpec {
    name: SlotName::Image,
    required: true,
    max_items: 1,
    file_class: FileClass::Image,
}];

const BOOK_SLOTS: &[SlotSpec] = &[
    SlotSpec {
        name: SlotName::Cover,
        required: true,
        max_items: 1,
        file_class: FileClass::Image,
    },
    SlotSpec {
        name: SlotName::Document,
        required: true,
        max_items: 1,
        file_class: FileClass::Document,
    },
    SlotSpec {
        name: SlotName::Gallery,
        required: false,
        max_items: MAX_GALLERY_ITEMS,
        file_class: FileClass::Image,
    },
];

/// Kind of a composite resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Book category
    Category,
    /// Book
    Book,
}

impl ResourceKind {
    /// Document store collection holding this kind
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Category => "categories",
            ResourceKind::Book => "books",
        }
    }

    /// Asset slots declared for this kind
    pub fn slot_specs(&self) -> &'static [SlotSpec] {
        match self {
            ResourceKind::Category => CATEGORY_SLOTS,
            ResourceKind::Book => BOOK_SLOTS,
        }
    }

    /// Declaration of one slot, if the kind has it
    pub fn slot_spec(&self, slot: SlotName) -> Option<&'static SlotSpec> {
        self.slot_specs().iter().find(|s| s.name == slot)
    }

    /// Roles allowed to create, update or delete this kind
    pub fn write_roles(&self) -> &'static [Role] {
        match self {
            ResourceKind::Category => &[Role::Admin, Role::SuperAdmin],
            ResourceKind::Book => &[Role::Author, Role::Admin, Role::SuperAdmin],
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Category => "Category",
            ResourceKind::Book => "Book",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" | "categories" => Ok(ResourceKind::Category),
            "book" | "books" => Ok(ResourceKind::Book),
            other => Err(format!("Unknown resource kind: {other}")),
        }
    }
}

/// A document whose identity spans the document store and the blob store
pub trait CompositeResource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Kind of the resource
    const KIND: ResourceKind;

    /// Document id
    fn id(&self) -> &ResourceId;

    /// Folder token, assigned once at creation
    fn folder_id(&self) -> &FolderId;

    /// Folder token of the parent resource, for kinds nested in another subtree
    fn parent_folder_id(&self) -> Option<&FolderId>;

    /// Original creator
    fn created_by(&self) -> &UserId;

    /// Current asset slot values
    fn slots(&self) -> AssetSlots;

    /// Replace the value of one slot
    ///
    /// # Errors
    ///
    /// Returns an error if the kind has no such slot or the value shape is wrong.
    fn set_slot(&mut self, slot: SlotName, value: SlotValue) -> Result<(), String>;

    /// Record an update by a caller
    fn mark_updated(&mut self, by: &UserId, at: DateTime<Utc>);
}

/// Lowercase, hyphen-separated form of a name
///
/// # Examples
///
/// ```
/// use folio::domain::resource::slugify;
///
/// assert_eq!(slugify("  Science Fiction & Fantasy "), "science-fiction-fantasy");
/// ```
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Book category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ResourceId,

    /// Unique display name
    pub name: String,

    /// URL-friendly name
    pub slug: String,

    /// Category image
    pub image: AssetDescriptor,

    /// Storage subtree token
    pub folder_id: FolderId,

    /// Creator
    pub added_by: UserId,

    /// Last updater
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl CompositeResource for Category {
    const KIND: ResourceKind = ResourceKind::Category;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    fn parent_folder_id(&self) -> Option<&FolderId> {
        None
    }

    fn created_by(&self) -> &UserId {
        &self.added_by
    }

    fn slots(&self) -> AssetSlots {
        let mut slots = AssetSlots::new();
        slots.insert(SlotName::Image, SlotValue::Single(self.image.clone()));
        slots
    }

    fn set_slot(&mut self, slot: SlotName, value: SlotValue) -> Result<(), String> {
        match (slot, value) {
            (SlotName::Image, SlotValue::Single(d)) => {
                self.image = d;
                Ok(())
            }
            (slot, _) => Err(format!("Category has no slot '{slot}' of that shape")),
        }
    }

    fn mark_updated(&mut self, by: &UserId, at: DateTime<Utc>) {
        self.updated_by = Some(by.clone());
        self.updated_at = at;
    }
}

/// Book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Document id
    #[serde(rename = "_id")]
    pub id: ResourceId,

    /// Title
    pub title: String,

    /// URL-friendly title
    pub slug: String,

    /// Description
    pub description: String,

    /// Language of the text
    pub language: String,

    /// Release date as entered
    pub release_date: String,

    /// Page count
    pub pages: u32,

    /// Owning category
    pub category_id: ResourceId,

    /// Author user
    pub author_id: UserId,

    /// Folder token of the owning category at creation time
    pub category_folder_id: FolderId,

    /// Storage subtree token
    pub folder_id: FolderId,

    /// Cover image
    #[serde(rename = "coverImage")]
    pub cover: AssetDescriptor,

    /// Book document
    #[serde(rename = "pdf")]
    pub document: AssetDescriptor,

    /// Gallery images
    #[serde(rename = "images", default)]
    pub gallery: Vec<AssetDescriptor>,

    /// Average review rate
    #[serde(default)]
    pub rate: f64,

    /// Creator
    pub added_by: UserId,

    /// Last updater
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserId>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl CompositeResource for Book {
    const KIND: ResourceKind = ResourceKind::Book;

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn folder_id(&self) -> &FolderId {
        &self.folder_id
    }

    fn parent_folder_id(&self) -> Option<&FolderId> {
        Some(&self.category_folder_id)
    }

    fn created_by(&self) -> &UserId {
        &self.added_by
    }

    fn slots(&self) -> AssetSlots {
        let mut slots = AssetSlots::new();
        slots.insert(SlotName::Cover, SlotValue::Single(self.cover.clone()));
        slots.insert(SlotName::Document, SlotValue::Single(self.document.clone()));
        slots.insert(SlotName::Gallery, SlotValue::Sequence(self.gallery.clone()));
        slots
    }

    fn set_slot(&mut self, slot: SlotName, value: SlotValue) -> Result<(), String> {
        match (slot, value) {
            (SlotName::Cover, SlotValue::Single(d)) => self.cover = d,
            (SlotName::Document, SlotValue::Single(d)) => self.document = d,
            (SlotName::Gallery, SlotValue::Sequence(ds)) => self.gallery = ds,
            (slot, _) => return Err(format!("Book has no slot '{slot}' of that shape")),
        }
        Ok(())
    }

    fn mark_updated(&mut self, by: &UserId, at: DateTime<Utc>) {
        self.updated_by = Some(by.clone());
        self.updated_at = at;
    }
}

/// Input for creating a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    /// Display name
    pub name: String,
}

impl CategoryDraft {
    /// Create a draft
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Validate the draft
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Category name is required".to_string());
        }
        Ok(())
    }
}

/// Sparse update of a category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    /// New name
    pub name: Option<String>,
}

/// Input for creating a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Language
    pub language: String,
    /// Release date
    pub release_date: String,
    /// Page count
    pub pages: u32,
    /// Parent category
    pub category_id: ResourceId,
    /// Author user
    pub author_id: UserId,
}

impl BookDraft {
    /// Validate the draft
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("language", &self.language),
            ("releaseDate", &self.release_date),
        ] {
            if value.trim().is_empty() {
                return Err(format!("Book {field} is required"));
            }
        }
        if self.pages == 0 {
            return Err("Book pages must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Sparse update of a book
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New language
    pub language: Option<String>,
    /// New release date
    pub release_date: Option<String>,
    /// New page count
    pub pages: Option<u32>,
}

impl BookPatch {
    /// Merge the patch into a book
    pub fn apply_to(&self, book: &mut Book) -> Result<(), String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("Book title cannot be empty".to_string());
            }
            book.title = title.clone();
            book.slug = slugify(title);
        }
        if let Some(description) = &self.description {
            book.description = description.clone();
        }
        if let Some(language) = &self.language {
            book.language = language.clone();
        }
        if let Some(release_date) = &self.release_date {
            book.release_date = release_date.clone();
        }
        if let Some(pages) = self.pages {
            if pages == 0 {
                return Err("Book pages must be greater than 0".to_string());
            }
            book.pages = pages;
        }
        Ok(())
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.language.is_none()
            && self.release_date.is_none()
            && self.pages.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        let now = Utc::now();
        Book {
            id: ResourceId::new("b1").unwrap(),
            title: "Dune".to_string(),
            slug: "dune".to_string(),
            description: "Spice".to_string(),
            language: "en".to_string(),
            release_date: "1965-08-01".to_string(),
            pages: 412,
            category_id: ResourceId::new("c1").unwrap(),
            author_id: UserId::new("u1").unwrap(),
            category_folder_id: FolderId::new("ab12").unwrap(),
            folder_id: FolderId::new("x9k2").unwrap(),
            cover: AssetDescriptor::new("r1", "u1"),
            document: AssetDescriptor::new("r2", "u2"),
            gallery: vec![],
            rate: 0.0,
            added_by: UserId::new("u1").unwrap(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Science Fiction"), "science-fiction");
        assert_eq!(slugify("--A  B--"), "a-b");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_book_document_field_names() {
        let json = serde_json::to_value(book()).unwrap();
        assert_eq!(json["_id"], "b1");
        assert_eq!(json["folderId"], "x9k2");
        assert_eq!(json["categoryFolderId"], "ab12");
        assert_eq!(json["coverImage"]["public_id"], "r1");
        assert_eq!(json["pdf"]["secure_url"], "u2");
        assert!(json["images"].as_array().unwrap().is_empty());
        assert!(json.get("updatedBy").is_none());

        let back: Book = serde_json::from_value(json).unwrap();
        assert_eq!(back, book());
    }

    #[test]
    fn test_book_slot_shapes() {
        let mut b = book();
        assert!(b
            .set_slot(SlotName::Gallery, SlotValue::Single(AssetDescriptor::new("g", "u")))
            .is_err());
        assert!(b
            .set_slot(SlotName::Image, SlotValue::Single(AssetDescriptor::new("g", "u")))
            .is_err());
        b.set_slot(SlotName::Cover, SlotValue::Single(AssetDescriptor::new("r9", "u9")))
            .unwrap();
        assert_eq!(b.slots().single(SlotName::Cover).unwrap().remote_id, "r9");
    }

    #[test]
    fn test_patch_is_sparse() {
        let mut b = book();
        let patch = BookPatch {
            title: Some("Dune Messiah".to_string()),
            ..Default::default()
        };
        patch.apply_to(&mut b).unwrap();
        assert_eq!(b.title, "Dune Messiah");
        assert_eq!(b.slug, "dune-messiah");
        assert_eq!(b.pages, 412);
        assert_eq!(b.description, "Spice");
        assert!(BookPatch::default().is_empty());
    }

    #[test]
    fn test_kind_declarations() {
        assert_eq!(ResourceKind::Book.collection(), "books");
        assert!(ResourceKind::Book.slot_spec(SlotName::Cover).unwrap().required);
        assert!(!ResourceKind::Book.slot_spec(SlotName::Gallery).unwrap().required);
        assert!(ResourceKind::Category.slot_spec(SlotName::Cover).is_none());
        assert!(!ResourceKind::Category.write_roles().contains(&Role::Author));
    }

    #[test]
    fn test_draft_validation() {
        assert!(CategoryDraft::new(" ").validate().is_err());
        assert!(CategoryDraft::new("Poetry").validate().is_ok());
    }
}
