//! Error types for `masthead-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("content not found: {0}")]
  ContentNotFound(Uuid),

  #[error("tag not found: {0}")]
  TagNotFound(Uuid),

  #[error("author not found: {0}")]
  AuthorNotFound(Uuid),

  #[error("feature type not found: {0}")]
  FeatureTypeNotFound(Uuid),

  #[error("slug already in use: {0:?}")]
  DuplicateSlug(String),

  #[error("unknown document type discriminant: {0:?}")]
  UnknownDocType(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
