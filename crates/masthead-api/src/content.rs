//! Handlers for the `/content` routes.
//!
//! Query params map directly to [`SearchCriteria`] fields; list-valued
//! parameters are accepted as comma-separated strings.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use masthead_core::{
  content::{Content, NewContent, PubStatus},
  store::ContentStore,
};
use masthead_search::{
  backend::IndexBackend,
  query::{self, SearchCriteria},
  readonly::ReadOnlyContent,
  sync::IndexedStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Free-text query; switches ordering to relevance.
  pub query:         Option<String>,
  pub id:            Option<String>,
  pub status:        Option<PubStatus>,
  pub before:        Option<DateTime<Utc>>,
  pub after:         Option<DateTime<Utc>>,
  /// Comma-separated tag slugs; all must match.
  pub tags:          Option<String>,
  /// Comma-separated feature-type slugs; all must match.
  pub feature_types: Option<String>,
  /// Comma-separated author usernames; prefix with `-` to exclude.
  pub authors:       Option<String>,
  /// Comma-separated document types, e.g. `content_article,content_video`.
  pub doc_types:     Option<String>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

fn split_csv(value: Option<String>) -> Vec<String> {
  value
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default()
}

impl SearchParams {
  fn into_criteria(self) -> (SearchCriteria, Option<usize>, Option<usize>) {
    let criteria = SearchCriteria {
      query:         self.query,
      id:            self.id,
      status:        self.status,
      before:        self.before,
      after:         self.after,
      tags:          split_csv(self.tags),
      feature_types: split_csv(self.feature_types),
      authors:       split_csv(self.authors),
      doc_types:     split_csv(self.doc_types),
    };
    (criteria, self.limit, self.offset)
  }
}

/// `GET /content[?query=…][&tags=…][&feature_types=…][&authors=…]…`
pub async fn search<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ReadOnlyContent>>, ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  let (criteria, limit, offset) = params.into_criteria();

  let mut built = query::build(&criteria, ix.registry());
  if let Some(limit) = limit {
    built = built.limit(limit);
  }
  if let Some(offset) = offset {
    built = built.offset(offset);
  }

  let raws = ix
    .backend()
    .search(&built)
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?;
  Ok(Json(ix.registry().revive_all(&raws)))
}

/// `GET /content/{id}` — served from the index alone.
pub async fn get_one<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ReadOnlyContent>, ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  let revived = ix.fetch_readonly(id).await?;
  revived
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("content {id}")))
}

/// `POST /content`
pub async fn create<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Json(input): Json<NewContent>,
) -> Result<(StatusCode, Json<Content>), ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  let content = ix.create(input).await?;
  Ok((StatusCode::CREATED, Json(content)))
}

/// `PUT /content/{id}`
pub async fn update<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Path(id): Path<Uuid>,
  Json(content): Json<Content>,
) -> Result<Json<Content>, ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  if content.id != id {
    return Err(ApiError::BadRequest(
      "body id does not match the URL".into(),
    ));
  }
  let content = ix.update(content).await?;
  Ok(Json(content))
}

/// `DELETE /content/{id}`
pub async fn delete<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  if ix.delete(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("content {id}")))
  }
}

/// `PUT /content/{id}/tags` — replace the tag set; the index receives a
/// partial update only.
pub async fn put_tags<S, B>(
  State(ix): State<Arc<IndexedStore<S, B>>>,
  Path(id): Path<Uuid>,
  Json(tag_ids): Json<Vec<Uuid>>,
) -> Result<StatusCode, ApiError>
where
  S: ContentStore,
  B: IndexBackend,
{
  ix.replace_tags(id, tag_ids).await?;
  Ok(StatusCode::NO_CONTENT)
}
