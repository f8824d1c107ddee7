//! Index document shapes and the document-type registry.
//!
//! Documents are the denormalized read models stored in the index. They
//! carry everything the display paths need so that reads never have to
//! touch the relational store.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use masthead_core::content::{ContentBody, PubStatus};
use masthead_core::taxonomy::TagKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Sub-documents ───────────────────────────────────────────────────────────

/// A tag as embedded in a content document. `doc_type` is the tag's own
/// discriminator so the read-only path can revive the right kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagDoc {
  pub id:       Uuid,
  pub doc_type: String,
  pub name:     String,
  pub slug:     String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorDoc {
  pub id:         Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTypeDoc {
  pub name: String,
  pub slug: String,
}

// ─── Content document ────────────────────────────────────────────────────────

/// The full index document for a piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDoc {
  pub id:            Uuid,
  /// Discriminator identifying the concrete subtype.
  pub doc_type:      String,
  pub published:     Option<DateTime<Utc>>,
  pub last_modified: DateTime<Utc>,
  pub title:         String,
  pub slug:          String,
  pub description:   String,
  pub subhead:       Option<String>,
  /// Computed from `published` at projection time.
  pub status:        PubStatus,
  /// Computed absolute URL; `None` when no route matches.
  pub url:           Option<String>,
  /// Ordered per the projector's weight rule.
  pub tags:          Vec<TagDoc>,
  pub authors:       Vec<AuthorDoc>,
  pub feature_type:  Option<FeatureTypeDoc>,
  /// Variant payload; decoded via `doc_type`.
  pub body:          serde_json::Value,
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// The closed set of document types known to this deployment.
///
/// Built once at startup from the static variant lists; immutable after
/// construction and shared by reference. There is no runtime subtype
/// registration — a discriminator missing here can only come from a stale
/// index document.
#[derive(Debug, Clone)]
pub struct DocTypeRegistry {
  content_types: BTreeSet<&'static str>,
  tag_types:     BTreeSet<&'static str>,
}

impl DocTypeRegistry {
  /// The registry covering every built-in content and tag subtype.
  pub fn builtin() -> Self {
    Self {
      content_types: ContentBody::DOC_TYPES.into_iter().collect(),
      tag_types:     TagKind::DOC_TYPES.into_iter().collect(),
    }
  }

  pub fn is_content_type(&self, doc_type: &str) -> bool {
    self.content_types.contains(doc_type)
  }

  pub fn is_tag_type(&self, doc_type: &str) -> bool {
    self.tag_types.contains(doc_type)
  }

  /// All registered content document types, in stable order.
  pub fn content_types(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.content_types.iter().copied()
  }
}

impl Default for DocTypeRegistry {
  fn default() -> Self { Self::builtin() }
}
