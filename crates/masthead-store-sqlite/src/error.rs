//! Error type for `masthead-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] masthead_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("content not found: {0}")]
  ContentNotFound(uuid::Uuid),

  #[error("slug already in use: {0:?}")]
  DuplicateSlug(String),

  #[error("username already in use: {0:?}")]
  DuplicateUsername(String),

  #[error("unknown document type discriminant: {0:?}")]
  UnknownDocType(String),

  #[error("unknown tag kind: {0:?}")]
  UnknownTagKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
