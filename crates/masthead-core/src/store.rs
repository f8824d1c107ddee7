//! The `ContentStore` trait.
//!
//! Implemented by relational backends (e.g. `masthead-store-sqlite`).
//! Higher layers — the index synchronizer, the HTTP API — depend on this
//! abstraction, not on any concrete backend. Index synchronization is *not*
//! the store's job: the caller that performs a write invokes the
//! synchronizer explicitly afterwards, so the causal chain stays visible.

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::{
  content::{Content, HydratedContent, NewContent},
  taxonomy::{Author, FeatureType, NewAuthor, Tag, TagKind},
};

/// Abstraction over the relational backend for content and its reference
/// data.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Content ───────────────────────────────────────────────────────────

  /// Persist a new content row plus its tag/author associations. The store
  /// assigns the UUID and `last_modified` and derives the slug.
  fn create_content(
    &self,
    input: NewContent,
  ) -> impl Future<Output = Result<Content, Self::Error>> + Send + '_;

  /// Overwrite an existing row and its associations. Bumps `last_modified`;
  /// an empty slug is re-derived from the title.
  fn update_content(
    &self,
    content: Content,
  ) -> impl Future<Output = Result<Content, Self::Error>> + Send + '_;

  /// Retrieve a content row by UUID. Returns `None` if not found.
  fn get_content(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Content>, Self::Error>> + Send + '_;

  /// Retrieve a content row with tags, authors, and feature type resolved.
  fn hydrate(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<HydratedContent>, Self::Error>> + Send + '_;

  /// Delete a content row and its association rows. Returns `false` if the
  /// row did not exist. Tags, authors, and feature types are untouched.
  fn delete_content(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Replace the tag association set for a content row. Does not bump
  /// `last_modified`; tag churn is not an edit.
  fn set_tags(
    &self,
    id: Uuid,
    tag_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All content ids, for full reindexing.
  fn list_content_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  /// Create a tag; the slug is derived from the name and must be unique.
  fn create_tag(
    &self,
    name: String,
    kind: TagKind,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + '_;

  /// Resolve a set of tag ids. Unknown ids are silently absent from the
  /// result.
  fn get_tags(
    &self,
    ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  /// How many content rows reference each tag. Feeds the projector's tag
  /// ordering.
  fn tag_usage(
    &self,
  ) -> impl Future<Output = Result<HashMap<Uuid, u64>, Self::Error>> + Send + '_;

  fn create_feature_type(
    &self,
    name: String,
  ) -> impl Future<Output = Result<FeatureType, Self::Error>> + Send + '_;

  fn create_author(
    &self,
    input: NewAuthor,
  ) -> impl Future<Output = Result<Author, Self::Error>> + Send + '_;
}
