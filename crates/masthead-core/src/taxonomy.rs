//! Reference entities used to classify content: tags, feature types, and
//! authors.
//!
//! Tags and feature types are independently owned reference data. Deleting a
//! piece of content never deletes them; only the association rows go away.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::slug::slugify;

// ─── Tags ────────────────────────────────────────────────────────────────────

/// The concrete kind of a tag. `Tag` is the plain base kind; `Section`
/// represents a major site section and carries no extra fields, but sorts
/// ahead of plain tags when projected into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
  Tag,
  Section,
}

impl TagKind {
  /// The index document-type name for this kind.
  pub fn doc_type(self) -> &'static str {
    match self {
      Self::Tag => "content_tag",
      Self::Section => "content_section",
    }
  }

  /// Reverse of [`TagKind::doc_type`]. Unknown names yield `None`.
  pub fn from_doc_type(doc_type: &str) -> Option<Self> {
    match doc_type {
      "content_tag" => Some(Self::Tag),
      "content_section" => Some(Self::Section),
      _ => None,
    }
  }

  /// All registered tag document types, for registry construction.
  pub const DOC_TYPES: [&'static str; 2] = ["content_tag", "content_section"];

  pub fn is_base(self) -> bool { matches!(self, Self::Tag) }
}

/// A topical label applied to content. Slug uniqueness is enforced by the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
  pub id:   Uuid,
  pub name: String,
  pub slug: String,
  pub kind: TagKind,
}

impl Tag {
  /// Build a tag with a fresh UUID and a slug derived from `name`.
  pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
    let name = name.into();
    let slug = slugify(&name);
    Self { id: Uuid::new_v4(), name, slug, kind }
  }
}

// ─── Feature types ───────────────────────────────────────────────────────────

/// Classifies the *kind* of a piece of content (e.g. "News in Brief"),
/// as opposed to its topic. Tag-shaped but semantically distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureType {
  pub id:   Uuid,
  pub name: String,
  pub slug: String,
}

impl FeatureType {
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    let slug = slugify(&name);
    Self { id: Uuid::new_v4(), name, slug }
  }
}

// ─── Authors ─────────────────────────────────────────────────────────────────

/// A content author. Identity management is external; this is the subset of
/// the user record that content and its index documents care about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
  pub id:         Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}

/// Input to [`crate::store::ContentStore::create_author`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuthor {
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}
