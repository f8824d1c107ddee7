//! In-memory [`IndexBackend`] — a test double, not a search engine.
//!
//! Holds raw JSON documents in a map and evaluates [`IndexQuery`] clauses
//! directly against them. Useful for tests and local development, in the
//! same spirit as an in-memory SQLite store. Every write is immediately
//! visible, so the `refresh` flag is a no-op here.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
  backend::IndexBackend,
  document::ContentDoc,
  error::IndexError,
  query::{Clause, IndexQuery, SortKey},
};

/// Shared in-process document index. Cloning is not provided; wrap in an
/// `Arc` to share.
#[derive(Debug, Default)]
pub struct MemoryIndex {
  docs: Mutex<HashMap<(String, Uuid), Value>>,
}

impl MemoryIndex {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<(String, Uuid), Value>> {
    // A poisoned lock only means a panicking test; the data is plain JSON.
    self.docs.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Number of documents currently held.
  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }
}

impl IndexBackend for MemoryIndex {
  async fn upsert(
    &self,
    doc_type: &str,
    id: Uuid,
    doc: &ContentDoc,
  ) -> Result<(), IndexError> {
    let value = serde_json::to_value(doc)?;
    self.lock().insert((doc_type.to_owned(), id), value);
    Ok(())
  }

  async fn update_partial(
    &self,
    doc_type: &str,
    id: Uuid,
    partial: &Value,
    _refresh: bool,
  ) -> Result<(), IndexError> {
    let mut docs = self.lock();
    let key = (doc_type.to_owned(), id);
    let Some(existing) = docs.get_mut(&key) else {
      return Err(IndexError::NotFound { doc_type: doc_type.to_owned(), id });
    };
    if let (Value::Object(doc), Value::Object(fields)) = (existing, partial) {
      for (k, v) in fields {
        doc.insert(k.clone(), v.clone());
      }
    }
    Ok(())
  }

  async fn delete(&self, doc_type: &str, id: Uuid) -> Result<(), IndexError> {
    match self.lock().remove(&(doc_type.to_owned(), id)) {
      Some(_) => Ok(()),
      None => {
        Err(IndexError::NotFound { doc_type: doc_type.to_owned(), id })
      }
    }
  }

  async fn fetch(
    &self,
    doc_type: &str,
    id: Uuid,
  ) -> Result<Option<Value>, IndexError> {
    Ok(self.lock().get(&(doc_type.to_owned(), id)).cloned())
  }

  async fn search(
    &self,
    query: &IndexQuery,
  ) -> Result<Vec<Value>, IndexError> {
    let docs = self.lock();
    let mut hits: Vec<Value> = docs
      .iter()
      .filter(|((doc_type, _), _)| {
        query.doc_types().iter().any(|t| t == doc_type)
      })
      .filter(|(_, doc)| query.clauses().iter().all(|c| eval(c, doc)))
      .map(|(_, doc)| doc.clone())
      .collect();

    sort_hits(&mut hits, query.sort());

    let (offset, limit) = query.page();
    let hits = hits
      .into_iter()
      .skip(offset)
      .take(limit.unwrap_or(usize::MAX))
      .collect();
    Ok(hits)
  }
}

// ─── Clause evaluation ───────────────────────────────────────────────────────

fn eval(clause: &Clause, doc: &Value) -> bool {
  match clause {
    Clause::MatchText(text) => {
      let needle = text.to_lowercase();
      ["title", "description", "subhead"].iter().any(|field| {
        doc
          .get(field)
          .and_then(Value::as_str)
          .is_some_and(|s| s.to_lowercase().contains(&needle))
      })
    }
    Clause::Id(id) => field_str(doc, "id") == Some(id.to_string()),
    Clause::Status(status) => {
      field_str(doc, "status").as_deref() == Some(status.as_str())
    }
    Clause::PublishedBefore(bound) => {
      published(doc).is_some_and(|p| p <= *bound)
    }
    Clause::PublishedAfter(bound) => {
      published(doc).is_some_and(|p| p >= *bound)
    }
    Clause::TagSlug(slug) => sub_doc_field(doc, "tags", "slug", slug),
    Clause::FeatureTypeSlug(slug) => doc
      .get("feature_type")
      .and_then(|ft| ft.get("slug"))
      .and_then(Value::as_str)
      .is_some_and(|s| s == slug),
    Clause::AuthorUsername(username) => {
      sub_doc_field(doc, "authors", "username", username)
    }
    Clause::Not(inner) => !eval(inner, doc),
    Clause::AnyOf(options) => options.iter().any(|c| eval(c, doc)),
  }
}

fn field_str(doc: &Value, field: &str) -> Option<String> {
  doc.get(field).and_then(Value::as_str).map(str::to_owned)
}

fn published(doc: &Value) -> Option<DateTime<Utc>> {
  doc
    .get("published")
    .and_then(Value::as_str)
    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    .map(|dt| dt.with_timezone(&Utc))
}

fn sub_doc_field(doc: &Value, list: &str, field: &str, wanted: &str) -> bool {
  doc
    .get(list)
    .and_then(Value::as_array)
    .is_some_and(|items| {
      items.iter().any(|item| {
        item.get(field).and_then(Value::as_str) == Some(wanted)
      })
    })
}

fn sort_hits(hits: &mut [Value], sort: &[SortKey]) {
  hits.sort_by(|a, b| {
    for key in sort {
      let ord = match key {
        // No scoring model here; relevance keeps the tie-break order.
        SortKey::Relevance => std::cmp::Ordering::Equal,
        SortKey::LastModifiedDesc => {
          timestamp(b, "last_modified").cmp(&timestamp(a, "last_modified"))
        }
        SortKey::PublishedDesc => {
          timestamp(b, "published").cmp(&timestamp(a, "published"))
        }
      };
      if ord != std::cmp::Ordering::Equal {
        return ord;
      }
    }
    // Deterministic final tie-break.
    field_str(a, "id").cmp(&field_str(b, "id"))
  });
}

fn timestamp(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
  doc
    .get(field)
    .and_then(Value::as_str)
    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use masthead_core::content::PubStatus;

  use super::*;
  use crate::{
    document::{AuthorDoc, FeatureTypeDoc, TagDoc},
    query::SearchCriteria,
  };

  fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 6, d, 12, 0, 0).unwrap()
  }

  fn doc(title: &str, published: Option<DateTime<Utc>>) -> ContentDoc {
    ContentDoc {
      id:            Uuid::new_v4(),
      doc_type:      "content_article".into(),
      published,
      last_modified: published.unwrap_or_else(|| day(1)),
      title:         title.into(),
      slug:          title.to_lowercase().replace(' ', "-"),
      description:   String::new(),
      subhead:       None,
      status:        PubStatus::of(published),
      url:           None,
      tags:          vec![],
      authors:       vec![],
      feature_type:  None,
      body:          serde_json::json!({ "body_html": "" }),
    }
  }

  async fn seed(index: &MemoryIndex, docs: &[ContentDoc]) {
    for d in docs {
      index.upsert(&d.doc_type, d.id, d).await.unwrap();
    }
  }

  fn published_query(
    criteria: &SearchCriteria,
    now: DateTime<Utc>,
  ) -> IndexQuery {
    crate::query::build_at(criteria, &crate::DocTypeRegistry::builtin(), now)
  }

  #[tokio::test]
  async fn default_query_excludes_drafts_and_scheduled() {
    let index = MemoryIndex::new();
    let live = doc("live", Some(day(1)));
    let scheduled = doc("scheduled", Some(day(20)));
    let draft = doc("draft", None);
    seed(&index, &[live.clone(), scheduled, draft]).await;

    let q = published_query(&SearchCriteria::default(), day(10));
    let hits = index.search(&q).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], serde_json::json!(live.id));
  }

  #[tokio::test]
  async fn tag_filter_matches_embedded_tag_docs() {
    let index = MemoryIndex::new();
    let mut tagged = doc("tagged", Some(day(1)));
    tagged.tags.push(TagDoc {
      id:       Uuid::new_v4(),
      doc_type: "content_tag".into(),
      name:     "Politics".into(),
      slug:     "politics".into(),
    });
    let plain = doc("plain", Some(day(2)));
    seed(&index, &[tagged.clone(), plain]).await;

    let criteria =
      SearchCriteria { tags: vec!["politics".into()], ..Default::default() };
    let hits = index.search(&published_query(&criteria, day(10))).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], serde_json::json!(tagged.id));
  }

  #[tokio::test]
  async fn author_excludes_and_includes_combine() {
    let index = MemoryIndex::new();
    let author = |username: &str| AuthorDoc {
      id:         Uuid::new_v4(),
      username:   username.into(),
      first_name: String::new(),
      last_name:  String::new(),
    };

    let mut by_alice = doc("alice piece", Some(day(1)));
    by_alice.authors.push(author("alice"));
    let mut by_bob = doc("bob piece", Some(day(2)));
    by_bob.authors.push(author("bob"));
    let mut coauthored = doc("ghost piece", Some(day(3)));
    coauthored.authors.push(author("alice"));
    coauthored.authors.push(author("ghost"));
    seed(&index, &[by_alice.clone(), by_bob.clone(), coauthored]).await;

    let criteria = SearchCriteria {
      authors: vec!["-ghost".into(), "alice".into(), "bob".into()],
      ..Default::default()
    };
    let hits = index.search(&published_query(&criteria, day(10))).await.unwrap();
    let ids: Vec<_> = hits.iter().map(|h| h["id"].clone()).collect();
    assert_eq!(hits.len(), 2);
    assert!(ids.contains(&serde_json::json!(by_alice.id)));
    assert!(ids.contains(&serde_json::json!(by_bob.id)));
  }

  #[tokio::test]
  async fn feature_type_filter_matches_nested_slug() {
    let index = MemoryIndex::new();
    let mut brief = doc("brief", Some(day(1)));
    brief.feature_type =
      Some(FeatureTypeDoc { name: "News in Brief".into(), slug: "news-in-brief".into() });
    let other = doc("other", Some(day(2)));
    seed(&index, &[brief.clone(), other]).await;

    let criteria = SearchCriteria {
      feature_types: vec!["news-in-brief".into()],
      ..Default::default()
    };
    let hits = index.search(&published_query(&criteria, day(10))).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], serde_json::json!(brief.id));
  }

  #[tokio::test]
  async fn default_sort_is_last_modified_then_published_desc() {
    let index = MemoryIndex::new();
    let older = doc("older", Some(day(1)));
    let newer = doc("newer", Some(day(5)));
    seed(&index, &[older, newer]).await;

    let hits = index
      .search(&published_query(&SearchCriteria::default(), day(10)))
      .await
      .unwrap();
    assert_eq!(hits[0]["title"], "newer");
    assert_eq!(hits[1]["title"], "older");
  }

  #[tokio::test]
  async fn free_text_matches_title_case_insensitively() {
    let index = MemoryIndex::new();
    let hit = doc("The Best Sandwich", Some(day(1)));
    let miss = doc("Something Else", Some(day(2)));
    seed(&index, &[hit.clone(), miss]).await;

    let criteria = SearchCriteria {
      query: Some("sandwich".into()),
      ..Default::default()
    };
    let hits = index.search(&published_query(&criteria, day(10))).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], serde_json::json!(hit.id));
  }

  #[tokio::test]
  async fn partial_update_merges_fields() {
    let index = MemoryIndex::new();
    let d = doc("partial", Some(day(1)));
    seed(&index, std::slice::from_ref(&d)).await;

    let partial = serde_json::json!({ "tags": [{
      "id": Uuid::new_v4(),
      "doc_type": "content_tag",
      "name": "Late",
      "slug": "late",
    }]});
    index
      .update_partial(&d.doc_type, d.id, &partial, true)
      .await
      .unwrap();

    let fetched = index.fetch(&d.doc_type, d.id).await.unwrap().unwrap();
    assert_eq!(fetched["tags"][0]["slug"], "late");
    assert_eq!(fetched["title"], "partial");
  }

  #[tokio::test]
  async fn partial_update_of_missing_doc_is_not_found() {
    let index = MemoryIndex::new();
    let err = index
      .update_partial("content_article", Uuid::new_v4(), &serde_json::json!({}), true)
      .await
      .unwrap_err();
    assert!(matches!(err, IndexError::NotFound { .. }));
  }

  #[tokio::test]
  async fn pagination_applies_after_sorting() {
    let index = MemoryIndex::new();
    let docs: Vec<_> = (1..=5).map(|d| doc(&format!("d{d}"), Some(day(d)))).collect();
    seed(&index, &docs).await;

    let q = published_query(&SearchCriteria::default(), day(10))
      .offset(1)
      .limit(2);
    let hits = index.search(&q).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["title"], "d4");
    assert_eq!(hits[1]["title"], "d3");
  }
}
