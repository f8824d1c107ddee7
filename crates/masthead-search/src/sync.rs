//! Index synchronization.
//!
//! [`IndexedStore`] owns both the relational store and the index backend
//! and performs every index write from the same code path as the relational
//! write, directly after it — an explicit hook, not an observer. The two
//! stores are never transactionally linked: a crash between the writes
//! leaves the index stale until the next write to that entity.
//!
//! Failure policy: index errors surface as [`Error::Index`] after the
//! relational write has already committed; callers decide whether to retry.
//! The single tolerated divergence is a missing document on delete.

use std::{collections::HashMap, sync::Arc};

use masthead_core::{
  content::{Content, HydratedContent, NewContent},
  store::ContentStore,
  taxonomy::Tag,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  backend::IndexBackend,
  document::DocTypeRegistry,
  error::IndexError,
  project::{ProjectionContext, project, project_tags},
  readonly::ReadOnlyContent,
  urls::UrlResolver,
};

/// A relational store paired with an index backend.
pub struct IndexedStore<S, B> {
  store:    S,
  backend:  B,
  registry: DocTypeRegistry,
  urls:     Arc<dyn UrlResolver>,
}

impl<S, B> IndexedStore<S, B>
where
  S: ContentStore,
  B: IndexBackend,
{
  pub fn new(store: S, backend: B, urls: Arc<dyn UrlResolver>) -> Self {
    Self { store, backend, registry: DocTypeRegistry::builtin(), urls }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn backend(&self) -> &B { &self.backend }

  pub fn registry(&self) -> &DocTypeRegistry { &self.registry }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create a content row, then index it (unless `indexed` is off).
  pub async fn create(&self, input: NewContent) -> Result<Content> {
    let content = self
      .store
      .create_content(input)
      .await
      .map_err(box_store_err)?;
    self.index_one(content.id).await?;
    Ok(content)
  }

  /// Update a content row, then reindex it (unless `indexed` is off).
  pub async fn update(&self, content: Content) -> Result<Content> {
    let content = self
      .store
      .update_content(content)
      .await
      .map_err(box_store_err)?;
    self.index_one(content.id).await?;
    Ok(content)
  }

  /// Replace the tag set, then push a partial document update carrying only
  /// the re-projected tag list. The partial write asks the backend for a
  /// synchronous refresh because read paths may query immediately after.
  pub async fn replace_tags(&self, id: Uuid, tag_ids: Vec<Uuid>) -> Result<()> {
    let content = self
      .store
      .get_content(id)
      .await
      .map_err(box_store_err)?
      .ok_or(Error::ContentNotFound(id))?;

    self
      .store
      .set_tags(id, tag_ids.clone())
      .await
      .map_err(box_store_err)?;

    if !content.indexed {
      return Ok(());
    }

    let tags = self.store.get_tags(tag_ids).await.map_err(box_store_err)?;
    let usage = self.store.tag_usage().await.map_err(box_store_err)?;
    let partial = tags_partial(&tags, &usage)?;

    self
      .backend
      .update_partial(content.doc_type(), id, &partial, true)
      .await
      .map_err(|e| warn_index_err(id, e))?;
    Ok(())
  }

  /// Delete a content row, then its index document. A missing index
  /// document is not an error — the stores are allowed to have already
  /// diverged.
  pub async fn delete(&self, id: Uuid) -> Result<bool> {
    // Resolve the concrete doc_type before the row disappears.
    let Some(content) =
      self.store.get_content(id).await.map_err(box_store_err)?
    else {
      return Ok(false);
    };

    let deleted = self
      .store
      .delete_content(id)
      .await
      .map_err(box_store_err)?;

    match self.backend.delete(content.doc_type(), id).await {
      Ok(()) => {}
      Err(IndexError::NotFound { .. }) => {
        tracing::debug!(%id, "index document already absent on delete");
      }
      Err(e) => return Err(warn_index_err(id, e)),
    }
    Ok(deleted)
  }

  /// Re-project and upsert every content row. Used at startup with volatile
  /// backends and after bulk imports.
  pub async fn reindex_all(&self) -> Result<usize> {
    let ids = self.store.list_content_ids().await.map_err(box_store_err)?;
    let mut indexed = 0;
    for id in ids {
      if self.index_one(id).await? {
        indexed += 1;
      }
    }
    tracing::info!(indexed, "reindex complete");
    Ok(indexed)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch a content document from the index and revive it read-only,
  /// without touching the relational store. Searches every registered
  /// doc type because the caller does not know the concrete subtype.
  pub async fn fetch_readonly(&self, id: Uuid) -> Result<Option<ReadOnlyContent>> {
    for doc_type in self.registry.content_types() {
      if let Some(doc) = self.backend.fetch(doc_type, id).await? {
        return Ok(self.registry.revive(&doc));
      }
    }
    Ok(None)
  }

  // ── Internals ─────────────────────────────────────────────────────────

  /// Project and upsert a single row. Returns whether an index write
  /// happened (`indexed = false` rows are skipped).
  async fn index_one(&self, id: Uuid) -> Result<bool> {
    let Some(hydrated) =
      self.store.hydrate(id).await.map_err(box_store_err)?
    else {
      return Err(Error::ContentNotFound(id));
    };

    if !hydrated.content.indexed {
      return Ok(false);
    }

    let usage = self.store.tag_usage().await.map_err(box_store_err)?;
    let doc = project_with(&hydrated, self.urls.as_ref(), &usage)?;
    self
      .backend
      .upsert(&doc.doc_type, doc.id, &doc)
      .await
      .map_err(|e| warn_index_err(id, e))?;
    Ok(true)
  }
}

fn project_with(
  hydrated: &HydratedContent,
  urls: &dyn UrlResolver,
  usage: &HashMap<Uuid, u64>,
) -> Result<crate::document::ContentDoc> {
  let ctx = ProjectionContext { urls, tag_usage: usage };
  project(hydrated, &ctx)
}

/// The tags-only partial document for `update_partial`.
fn tags_partial(
  tags: &[Tag],
  usage: &HashMap<Uuid, u64>,
) -> Result<serde_json::Value> {
  let docs = project_tags(tags, usage);
  Ok(serde_json::json!({ "tags": serde_json::to_value(docs)? }))
}

fn box_store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

fn warn_index_err(id: Uuid, e: IndexError) -> Error {
  tracing::warn!(%id, error = %e, "index write failed after relational write");
  Error::Index(e)
}
