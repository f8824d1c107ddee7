//! The `IndexBackend` trait.
//!
//! The search index is an external black-box document store; this trait is
//! the full contract the core consumes. Production deployments implement it
//! against their search service; [`crate::memory::MemoryIndex`] implements
//! it in process for tests and local development.

use std::future::Future;

use uuid::Uuid;

use crate::{document::ContentDoc, error::IndexError, query::IndexQuery};

/// Abstraction over the document index. Documents are addressed by
/// (document type, id); the index name itself is backend configuration.
pub trait IndexBackend: Send + Sync {
  /// Insert or replace the document for (doc_type, id).
  fn upsert(
    &self,
    doc_type: &str,
    id: Uuid,
    doc: &ContentDoc,
  ) -> impl Future<Output = Result<(), IndexError>> + Send;

  /// Merge `partial` (a subset of document fields) into an existing
  /// document. `refresh` forces the change to be visible to queries before
  /// the call returns; read-after-write paths depend on it.
  ///
  /// Fails with [`IndexError::NotFound`] if no document exists.
  fn update_partial(
    &self,
    doc_type: &str,
    id: Uuid,
    partial: &serde_json::Value,
    refresh: bool,
  ) -> impl Future<Output = Result<(), IndexError>> + Send;

  /// Remove the document. Fails with [`IndexError::NotFound`] if absent;
  /// the delete synchronization path tolerates that case.
  fn delete(
    &self,
    doc_type: &str,
    id: Uuid,
  ) -> impl Future<Output = Result<(), IndexError>> + Send;

  /// Fetch a raw document, or `None` if absent.
  fn fetch(
    &self,
    doc_type: &str,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<serde_json::Value>, IndexError>> + Send;

  /// Execute a composed query and return matching raw documents in query
  /// order.
  fn search(
    &self,
    query: &IndexQuery,
  ) -> impl Future<Output = Result<Vec<serde_json::Value>, IndexError>> + Send;
}
