//! Error types for `masthead-search`.

use thiserror::Error;
use uuid::Uuid;

/// Errors from the index backend itself.
#[derive(Debug, Error)]
pub enum IndexError {
  /// The addressed document does not exist. Tolerated (and swallowed) only
  /// on the delete path; the index and the relational store are allowed to
  /// have already diverged.
  #[error("document not found: {doc_type}/{id}")]
  NotFound { doc_type: String, id: Uuid },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("index backend error: {0}")]
  Backend(String),
}

/// Errors from the synchronization and reconstruction layers.
#[derive(Debug, Error)]
pub enum Error {
  #[error("content not found: {0}")]
  ContentNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("index error: {0}")]
  Index(#[from] IndexError),

  #[error("core error: {0}")]
  Core(#[from] masthead_core::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
