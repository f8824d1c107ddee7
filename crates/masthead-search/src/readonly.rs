//! Read-only reconstruction from index documents.
//!
//! Display paths that only need denormalized fields can skip the relational
//! store entirely and revive a [`ReadOnlyContent`] straight from a document.
//! It is a distinct type from [`masthead_core::content::Content`] on
//! purpose: no association-mutating operations exist on it, so a caller
//! cannot edit a read-only view and believe the change persisted.

use chrono::{DateTime, Utc};
use masthead_core::content::{ContentBody, PubStatus};
use masthead_core::taxonomy::TagKind;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::document::{AuthorDoc, ContentDoc, DocTypeRegistry, FeatureTypeDoc};

/// A tag revived from an embedded sub-document.
#[derive(Debug, Clone, Serialize)]
pub struct ReadOnlyTag {
  pub id:   Uuid,
  pub kind: TagKind,
  pub name: String,
  pub slug: String,
}

/// A non-persistable content view revived from an index document.
#[derive(Debug, Clone, Serialize)]
pub struct ReadOnlyContent {
  pub id:            Uuid,
  pub doc_type:      String,
  pub published:     Option<DateTime<Utc>>,
  pub last_modified: DateTime<Utc>,
  pub title:         String,
  pub slug:          String,
  pub description:   String,
  pub subhead:       Option<String>,
  pub status:        PubStatus,
  pub url:           Option<String>,
  pub tags:          Vec<ReadOnlyTag>,
  pub authors:       Vec<AuthorDoc>,
  pub feature_type:  Option<FeatureTypeDoc>,
  pub body:          ContentBody,
}

impl DocTypeRegistry {
  /// Revive a content document. An unregistered discriminator — or a
  /// document too malformed to decode — yields `None`: stale index entries
  /// are treated as absent data, never as errors that poison a list page.
  pub fn revive(&self, raw: &Value) -> Option<ReadOnlyContent> {
    let doc_type = raw.get("doc_type")?.as_str()?;
    if !self.is_content_type(doc_type) {
      tracing::debug!(doc_type, "skipping unregistered content doc type");
      return None;
    }

    let doc: ContentDoc = serde_json::from_value(raw.clone()).ok()?;
    let body = ContentBody::from_doc(&doc.doc_type, doc.body)?.ok()?;

    let tags = doc
      .tags
      .into_iter()
      .filter_map(|tag| {
        // Tags with an unregistered kind drop out individually.
        let kind = TagKind::from_doc_type(&tag.doc_type)?;
        Some(ReadOnlyTag { id: tag.id, kind, name: tag.name, slug: tag.slug })
      })
      .collect();

    Some(ReadOnlyContent {
      id:            doc.id,
      doc_type:      doc.doc_type,
      published:     doc.published,
      last_modified: doc.last_modified,
      title:         doc.title,
      slug:          doc.slug,
      description:   doc.description,
      subhead:       doc.subhead,
      status:        doc.status,
      url:           doc.url,
      tags,
      authors:       doc.authors,
      feature_type:  doc.feature_type,
      body,
    })
  }

  /// Revive every document in `raws`, silently dropping the unrevivable.
  pub fn revive_all(&self, raws: &[Value]) -> Vec<ReadOnlyContent> {
    raws.iter().filter_map(|raw| self.revive(raw)).collect()
  }
}
