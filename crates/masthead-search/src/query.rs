//! Query builder.
//!
//! Translates a small set of structured, optional filter parameters into an
//! [`IndexQuery`] — an opaque, composable query object that callers may
//! refine (extra clauses, pagination) before handing it to a backend for
//! execution. Execution itself is the backend's concern.

use chrono::{DateTime, Utc};
use masthead_core::content::PubStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::DocTypeRegistry;

// ─── Criteria ────────────────────────────────────────────────────────────────

/// Structured filter parameters. Every field is optional; empty lists
/// contribute nothing (they never mean "match nothing").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
  /// Free-text query. Present ⇒ full-text match and relevance ordering;
  /// absent ⇒ descending (last_modified, published) sort.
  #[serde(default)]
  pub query:         Option<String>,
  /// Raw id token. An unparseable UUID drops the clause, not the query.
  #[serde(default)]
  pub id:            Option<String>,
  /// Explicit status filter; suppresses the default published-only filter.
  #[serde(default)]
  pub status:        Option<PubStatus>,
  /// Published-window bounds; either one suppresses the default
  /// published-only filter.
  #[serde(default)]
  pub before:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub after:         Option<DateTime<Utc>>,
  /// Tag slugs, ANDed.
  #[serde(default)]
  pub tags:          Vec<String>,
  /// Feature-type slugs, ANDed.
  #[serde(default)]
  pub feature_types: Vec<String>,
  /// Author usernames. A leading `-` excludes that author; excludes are
  /// ANDed, includes are ORed among themselves, and the two groups AND.
  #[serde(default)]
  pub authors:       Vec<String>,
  /// Concrete subtype restriction; unknown names are dropped and an empty
  /// list means "all registered subtypes".
  #[serde(default)]
  pub doc_types:     Vec<String>,
}

// ─── Query AST ───────────────────────────────────────────────────────────────

/// A single filter clause. Clauses at the top level of an [`IndexQuery`]
/// combine with logical AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
  MatchText(String),
  Id(Uuid),
  Status(PubStatus),
  PublishedBefore(DateTime<Utc>),
  PublishedAfter(DateTime<Utc>),
  TagSlug(String),
  FeatureTypeSlug(String),
  AuthorUsername(String),
  Not(Box<Clause>),
  AnyOf(Vec<Clause>),
}

/// Sort order, applied in sequence as tiebreaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  /// Backend-defined relevance; used only with a free-text match.
  Relevance,
  LastModifiedDesc,
  PublishedDesc,
}

/// A composed index query. Opaque to callers except through the refinement
/// methods; backends read it through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
  doc_types: Vec<String>,
  clauses:   Vec<Clause>,
  sort:      Vec<SortKey>,
  limit:     Option<usize>,
  offset:    usize,
}

impl IndexQuery {
  /// A query over the given document types with no clauses and the default
  /// (last_modified, published) descending sort.
  pub fn over(doc_types: Vec<String>) -> Self {
    Self {
      doc_types,
      clauses: Vec::new(),
      sort: vec![SortKey::LastModifiedDesc, SortKey::PublishedDesc],
      limit: None,
      offset: 0,
    }
  }

  // ── Refinement ────────────────────────────────────────────────────────

  pub fn and(mut self, clause: Clause) -> Self {
    self.clauses.push(clause);
    self
  }

  pub fn sorted_by(mut self, sort: Vec<SortKey>) -> Self {
    self.sort = sort;
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = offset;
    self
  }

  // ── Backend accessors ─────────────────────────────────────────────────

  pub fn doc_types(&self) -> &[String] { &self.doc_types }

  pub fn clauses(&self) -> &[Clause] { &self.clauses }

  pub fn sort(&self) -> &[SortKey] { &self.sort }

  pub fn page(&self) -> (usize, Option<usize>) { (self.offset, self.limit) }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Build a query from `criteria` using the current time for the default
/// published-only filter.
pub fn build(
  criteria: &SearchCriteria,
  registry: &DocTypeRegistry,
) -> IndexQuery {
  build_at(criteria, registry, Utc::now())
}

/// [`build`] with an explicit clock, for deterministic callers and tests.
pub fn build_at(
  criteria: &SearchCriteria,
  registry: &DocTypeRegistry,
  now: DateTime<Utc>,
) -> IndexQuery {
  let doc_types: Vec<String> = if criteria.doc_types.is_empty() {
    registry.content_types().map(str::to_owned).collect()
  } else {
    criteria
      .doc_types
      .iter()
      .filter(|name| registry.is_content_type(name))
      .cloned()
      .collect()
  };

  let mut query = IndexQuery::over(doc_types);

  if let Some(token) = criteria.id.as_deref() {
    // Malformed id tokens drop the clause, not the whole query.
    match Uuid::parse_str(token) {
      Ok(id) => query = query.and(Clause::Id(id)),
      Err(_) => {
        tracing::debug!(token, "ignoring unparseable id filter");
      }
    }
  }

  if let Some(text) = criteria.query.as_deref() {
    query = query
      .and(Clause::MatchText(text.to_owned()))
      .sorted_by(vec![SortKey::Relevance]);
  }

  // The published-window filter supersedes the default published-only
  // filter; an explicit status filter suppresses it too.
  let has_window = criteria.before.is_some() || criteria.after.is_some();
  if let Some(before) = criteria.before {
    query = query.and(Clause::PublishedBefore(before));
  }
  if let Some(after) = criteria.after {
    query = query.and(Clause::PublishedAfter(after));
  }
  match criteria.status {
    Some(status) => query = query.and(Clause::Status(status)),
    None if !has_window => {
      query = query
        .and(Clause::Status(PubStatus::Final))
        .and(Clause::PublishedBefore(now));
    }
    None => {}
  }

  for slug in &criteria.tags {
    query = query.and(Clause::TagSlug(slug.clone()));
  }
  for slug in &criteria.feature_types {
    query = query.and(Clause::FeatureTypeSlug(slug.clone()));
  }

  query = add_author_clauses(query, &criteria.authors);
  query
}

/// Excludes (leading `-`) AND together as NOT clauses; the remaining
/// includes OR together in a single `AnyOf`.
fn add_author_clauses(mut query: IndexQuery, authors: &[String]) -> IndexQuery {
  let mut includes = Vec::new();
  for token in authors {
    match token.strip_prefix('-') {
      Some(excluded) => {
        query = query
          .and(Clause::Not(Box::new(Clause::AuthorUsername(excluded.to_owned()))));
      }
      None => includes.push(Clause::AuthorUsername(token.clone())),
    }
  }
  match includes.len() {
    0 => query,
    1 => query.and(includes.remove(0)),
    _ => query.and(Clause::AnyOf(includes)),
  }
}
