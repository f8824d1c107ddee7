//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Subtype payloads are
//! stored as compact JSON keyed by the `doc_type` discriminant column.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use masthead_core::{
  content::{Content, ContentBody},
  taxonomy::{Author, FeatureType, Tag, TagKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── TagKind ─────────────────────────────────────────────────────────────────

pub fn encode_tag_kind(k: TagKind) -> &'static str {
  match k {
    TagKind::Tag => "tag",
    TagKind::Section => "section",
  }
}

pub fn decode_tag_kind(s: &str) -> Result<TagKind> {
  match s {
    "tag" => Ok(TagKind::Tag),
    "section" => Ok(TagKind::Section),
    other => Err(Error::UnknownTagKind(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `content` row. Association ids are
/// fetched separately and supplied to [`RawContent::into_content`].
pub struct RawContent {
  pub content_id:      String,
  pub doc_type:        String,
  pub published:       Option<String>,
  pub last_modified:   String,
  pub title:           String,
  pub slug:            String,
  pub description:     String,
  pub subhead:         Option<String>,
  pub feature_type_id: Option<String>,
  pub indexed:         bool,
  pub body_json:       String,
}

impl RawContent {
  pub fn into_content(
    self,
    tags: Vec<Uuid>,
    authors: Vec<Uuid>,
  ) -> Result<Content> {
    let data: serde_json::Value = serde_json::from_str(&self.body_json)?;
    let body = ContentBody::from_doc(&self.doc_type, data)
      .ok_or_else(|| Error::UnknownDocType(self.doc_type.clone()))?
      .map_err(Error::Core)?;

    Ok(Content {
      id:            decode_uuid(&self.content_id)?,
      published:     self.published.as_deref().map(decode_dt).transpose()?,
      last_modified: decode_dt(&self.last_modified)?,
      title:         self.title,
      slug:          self.slug,
      description:   self.description,
      subhead:       self.subhead,
      feature_type:  self
        .feature_type_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      tags,
      authors,
      indexed:       self.indexed,
      body,
    })
  }
}

/// Raw strings read directly from a `tags` row.
pub struct RawTag {
  pub tag_id: String,
  pub name:   String,
  pub slug:   String,
  pub kind:   String,
}

impl RawTag {
  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag {
      id:   decode_uuid(&self.tag_id)?,
      name: self.name,
      slug: self.slug,
      kind: decode_tag_kind(&self.kind)?,
    })
  }
}

/// Raw strings read directly from a `feature_types` row.
pub struct RawFeatureType {
  pub feature_type_id: String,
  pub name:            String,
  pub slug:            String,
}

impl RawFeatureType {
  pub fn into_feature_type(self) -> Result<FeatureType> {
    Ok(FeatureType {
      id:   decode_uuid(&self.feature_type_id)?,
      name: self.name,
      slug: self.slug,
    })
  }
}

/// Raw strings read directly from an `authors` row.
pub struct RawAuthor {
  pub author_id:  String,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}

impl RawAuthor {
  pub fn into_author(self) -> Result<Author> {
    Ok(Author {
      id:         decode_uuid(&self.author_id)?,
      username:   self.username,
      first_name: self.first_name,
      last_name:  self.last_name,
    })
  }
}
