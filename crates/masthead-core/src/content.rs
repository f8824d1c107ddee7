//! Content — the base entity every publishable thing on the site shares.
//!
//! The original system modelled subtypes as a class hierarchy over a shared
//! table with a discriminator column. Here the subtype payload is a closed
//! tagged enum ([`ContentBody`]); the variant name is the discriminator and
//! [`ContentBody::doc_type`] yields the index document-type string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  slug::slugify,
  taxonomy::{Author, FeatureType, Tag},
};

// ─── Publication status ──────────────────────────────────────────────────────

/// A pure function of `published`: absent means draft, present means final.
/// Whether a final piece is live or merely scheduled is decided by comparing
/// `published` against a caller-supplied clock; it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubStatus {
  Draft,
  Final,
}

impl PubStatus {
  pub fn of(published: Option<DateTime<Utc>>) -> Self {
    match published {
      None => Self::Draft,
      Some(_) => Self::Final,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Final => "final",
    }
  }
}

// ─── Subtype bodies ──────────────────────────────────────────────────────────

/// A standard article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleBody {
  pub body_html: String,
}

/// A reader poll. Vendor-side poll hosting is out of scope; only the fields
/// the site renders and indexes live here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollBody {
  pub question_text: String,
  pub answer_type:   String,
  pub end_date:      Option<DateTime<Utc>>,
}

/// A video page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoBody {
  pub series_slug:      Option<String>,
  pub duration_seconds: Option<u32>,
}

/// The typed subtype payload of a piece of content. The variant name is the
/// discriminator persisted in the `doc_type` column and index field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ContentBody {
  Article(ArticleBody),
  Poll(PollBody),
  Video(VideoBody),
}

impl ContentBody {
  /// The index document-type name for this variant.
  /// Must stay in sync with [`ContentBody::DOC_TYPES`].
  pub fn doc_type(&self) -> &'static str {
    match self {
      Self::Article(_) => "content_article",
      Self::Poll(_) => "content_poll",
      Self::Video(_) => "content_video",
    }
  }

  /// All registered content document types. The registry is built from this
  /// static list at startup; there is no runtime subtype registration.
  pub const DOC_TYPES: [&'static str; 3] =
    ["content_article", "content_poll", "content_video"];

  /// The serde variant tag for a document-type name, if registered.
  fn variant_tag(doc_type: &str) -> Option<&'static str> {
    match doc_type {
      "content_article" => Some("article"),
      "content_poll" => Some("poll"),
      "content_video" => Some("video"),
      _ => None,
    }
  }

  /// Serialise the inner payload (without the type tag) for storage in the
  /// `body_json` column and the document `body` field.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    // The full serialised form is `{"type": "...", "data": <payload>}`.
    // We want only the payload.
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Decode a payload for the given document-type name. An unregistered
  /// name yields `None`; a registered name with a malformed payload yields
  /// `Some(Err(…))`.
  pub fn from_doc(
    doc_type: &str,
    data: serde_json::Value,
  ) -> Option<Result<Self>> {
    let tag = Self::variant_tag(doc_type)?;
    let wrapped = serde_json::json!({ "type": tag, "data": data });
    Some(serde_json::from_value(wrapped).map_err(Into::into))
  }
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// The base content entity. Owns its tag and author association sets;
/// tags, authors, and feature types themselves are independent reference
/// data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
  pub id:            Uuid,
  pub published:     Option<DateTime<Utc>>,
  pub last_modified: DateTime<Utc>,
  pub title:         String,
  pub slug:          String,
  pub description:   String,
  pub subhead:       Option<String>,
  pub feature_type:  Option<Uuid>,
  pub tags:          Vec<Uuid>,
  pub authors:       Vec<Uuid>,
  /// When false, saves never touch the search index.
  pub indexed:       bool,
  pub body:          ContentBody,
}

impl Content {
  pub fn status(&self) -> PubStatus { PubStatus::of(self.published) }

  /// Final and past its publication timestamp as of `now`.
  pub fn is_live(&self, now: DateTime<Utc>) -> bool {
    matches!(self.published, Some(p) if p <= now)
  }

  pub fn doc_type(&self) -> &'static str { self.body.doc_type() }
}

/// Input to [`crate::store::ContentStore::create_content`]. The store
/// assigns the UUID and `last_modified`; the slug is derived from the title
/// unless explicitly supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
  pub title:        String,
  #[serde(default)]
  pub slug:         Option<String>,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub subhead:      Option<String>,
  #[serde(default)]
  pub published:    Option<DateTime<Utc>>,
  #[serde(default)]
  pub feature_type: Option<Uuid>,
  #[serde(default)]
  pub tags:         Vec<Uuid>,
  #[serde(default)]
  pub authors:      Vec<Uuid>,
  #[serde(default = "default_indexed")]
  pub indexed:      bool,
  pub body:         ContentBody,
}

fn default_indexed() -> bool { true }

impl NewContent {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(title: impl Into<String>, body: ContentBody) -> Self {
    Self {
      title: title.into(),
      slug: None,
      description: String::new(),
      subhead: None,
      published: None,
      feature_type: None,
      tags: Vec::new(),
      authors: Vec::new(),
      indexed: true,
      body,
    }
  }

  /// The slug to persist: an explicit slug is normalised, otherwise one is
  /// derived from the title.
  pub fn resolved_slug(&self) -> String {
    match self.slug.as_deref() {
      Some(s) if !s.is_empty() => slugify(s),
      _ => slugify(&self.title),
    }
  }
}

// ─── Hydrated view ───────────────────────────────────────────────────────────

/// A content row with its associations resolved — the projector's input.
#[derive(Debug, Clone)]
pub struct HydratedContent {
  pub content:      Content,
  pub tags:         Vec<Tag>,
  pub authors:      Vec<Author>,
  pub feature_type: Option<FeatureType>,
}
