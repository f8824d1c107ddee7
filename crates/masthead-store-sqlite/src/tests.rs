//! Integration tests for `SqliteStore` against an in-memory database, plus
//! end-to-end synchronization tests pairing the store with the in-memory
//! index backend.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use masthead_core::{
  content::{ArticleBody, ContentBody, NewContent, PollBody, PubStatus},
  store::ContentStore,
  taxonomy::{NewAuthor, TagKind},
};
use masthead_search::{
  backend::IndexBackend,
  query::{self, SearchCriteria},
  sync::IndexedStore,
  urls::SiteRoutes,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn article(title: &str) -> NewContent {
  NewContent::new(
    title,
    ContentBody::Article(ArticleBody { body_html: "<p>body</p>".into() }),
  )
}

// ─── Content CRUD ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_content() {
  let s = store().await;

  let created = s.create_content(article("Hello, <b>World</b>!")).await.unwrap();
  assert_eq!(created.slug, "hello-world");
  assert_eq!(created.status(), PubStatus::Draft);

  let fetched = s.get_content(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.title, "Hello, <b>World</b>!");
  assert_eq!(fetched.slug, "hello-world");
  assert_eq!(fetched.doc_type(), "content_article");
}

#[tokio::test]
async fn get_content_missing_returns_none() {
  let s = store().await;
  assert!(s.get_content(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn explicit_slug_wins_over_derived() {
  let s = store().await;
  let mut input = article("Some Title");
  input.slug = Some("Hand Picked".into());

  let created = s.create_content(input).await.unwrap();
  assert_eq!(created.slug, "hand-picked");
}

#[tokio::test]
async fn update_bumps_last_modified_and_persists_fields() {
  let s = store().await;
  let created = s.create_content(article("Original")).await.unwrap();

  let mut edited = created.clone();
  edited.title = "Edited".into();
  edited.published =
    Some(Utc.with_ymd_and_hms(2016, 6, 6, 10, 0, 0).unwrap());
  let updated = s.update_content(edited).await.unwrap();

  assert!(updated.last_modified >= created.last_modified);
  assert_eq!(updated.status(), PubStatus::Final);

  let fetched = s.get_content(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.title, "Edited");
}

#[tokio::test]
async fn update_missing_content_errors() {
  let s = store().await;
  let phantom = {
    let mut c = s.create_content(article("temp")).await.unwrap();
    s.delete_content(c.id).await.unwrap();
    c.title = "Ghost".into();
    c
  };

  let err = s.update_content(phantom).await.unwrap_err();
  assert!(matches!(err, Error::ContentNotFound(_)));
}

#[tokio::test]
async fn delete_content_leaves_reference_data() {
  let s = store().await;
  let tag = s.create_tag("Politics".into(), TagKind::Tag).await.unwrap();

  let mut input = article("Tagged");
  input.tags = vec![tag.id];
  let created = s.create_content(input).await.unwrap();

  assert!(s.delete_content(created.id).await.unwrap());
  assert!(s.get_content(created.id).await.unwrap().is_none());

  // The tag survives; only the association rows went away.
  let tags = s.get_tags(vec![tag.id]).await.unwrap();
  assert_eq!(tags.len(), 1);
  assert!(s.tag_usage().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_content_returns_false() {
  let s = store().await;
  assert!(!s.delete_content(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn poll_body_round_trips() {
  let s = store().await;
  let input = NewContent::new(
    "Best Sandwich?",
    ContentBody::Poll(PollBody {
      question_text: "Which sandwich is best?".into(),
      answer_type:   "text".into(),
      end_date:      None,
    }),
  );

  let created = s.create_content(input).await.unwrap();
  let fetched = s.get_content(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.doc_type(), "content_poll");
  let ContentBody::Poll(poll) = fetched.body else { panic!("not a poll") };
  assert_eq!(poll.question_text, "Which sandwich is best?");
}

// ─── Associations & reference data ───────────────────────────────────────────

#[tokio::test]
async fn set_tags_replaces_association_set() {
  let s = store().await;
  let a = s.create_tag("Alpha".into(), TagKind::Tag).await.unwrap();
  let b = s.create_tag("Beta".into(), TagKind::Tag).await.unwrap();

  let mut input = article("Tagged");
  input.tags = vec![a.id];
  let created = s.create_content(input).await.unwrap();

  s.set_tags(created.id, vec![b.id]).await.unwrap();
  let fetched = s.get_content(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.tags, vec![b.id]);
}

#[tokio::test]
async fn tag_usage_counts_association_rows() {
  let s = store().await;
  let hot = s.create_tag("Hot".into(), TagKind::Tag).await.unwrap();
  let cold = s.create_tag("Cold".into(), TagKind::Tag).await.unwrap();

  for i in 0..3 {
    let mut input = article(&format!("Piece {i}"));
    input.tags = vec![hot.id];
    s.create_content(input).await.unwrap();
  }

  let usage = s.tag_usage().await.unwrap();
  assert_eq!(usage.get(&hot.id), Some(&3));
  assert_eq!(usage.get(&cold.id), None);
}

#[tokio::test]
async fn duplicate_tag_slug_is_rejected() {
  let s = store().await;
  s.create_tag("Politics".into(), TagKind::Tag).await.unwrap();

  let err = s
    .create_tag("Politics!".into(), TagKind::Section)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateSlug(slug) if slug == "politics"));
}

#[tokio::test]
async fn duplicate_author_username_is_rejected() {
  let s = store().await;
  let input = NewAuthor {
    username:   "asmith".into(),
    first_name: "Alice".into(),
    last_name:  "Smith".into(),
  };
  s.create_author(input.clone()).await.unwrap();

  let err = s.create_author(input).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateUsername(u) if u == "asmith"));
}

#[tokio::test]
async fn hydrate_resolves_all_associations() {
  let s = store().await;
  let tag = s.create_tag("Politics".into(), TagKind::Tag).await.unwrap();
  let ft = s.create_feature_type("News in Brief".into()).await.unwrap();
  let author = s
    .create_author(NewAuthor {
      username:   "asmith".into(),
      first_name: "Alice".into(),
      last_name:  "Smith".into(),
    })
    .await
    .unwrap();

  let mut input = article("Full House");
  input.tags = vec![tag.id];
  input.authors = vec![author.id];
  input.feature_type = Some(ft.id);
  let created = s.create_content(input).await.unwrap();

  let hydrated = s.hydrate(created.id).await.unwrap().unwrap();
  assert_eq!(hydrated.tags.len(), 1);
  assert_eq!(hydrated.tags[0].slug, "politics");
  assert_eq!(hydrated.authors.len(), 1);
  assert_eq!(hydrated.authors[0].username, "asmith");
  assert_eq!(hydrated.feature_type.unwrap().slug, "news-in-brief");
}

// ─── End-to-end synchronization ──────────────────────────────────────────────

async fn indexed_store()
-> IndexedStore<SqliteStore, masthead_search::memory::MemoryIndex> {
  IndexedStore::new(
    store().await,
    masthead_search::memory::MemoryIndex::new(),
    Arc::new(SiteRoutes::new("https://example.com")),
  )
}

fn by_id(id: Uuid) -> SearchCriteria {
  SearchCriteria {
    id: Some(id.to_string()),
    status: Some(PubStatus::Draft),
    ..Default::default()
  }
}

#[tokio::test]
async fn save_indexes_content_with_ordered_tags() {
  let ix = indexed_store().await;
  let plain = ix
    .store()
    .create_tag("TagA".into(), TagKind::Tag)
    .await
    .unwrap();
  let section = ix
    .store()
    .create_tag("SubTag".into(), TagKind::Section)
    .await
    .unwrap();

  // Five other pieces use the plain tag so its usage count dominates
  // among plain tags; the section must still sort first.
  for i in 0..5 {
    let mut other = article(&format!("Other {i}"));
    other.tags = vec![plain.id];
    ix.create(other).await.unwrap();
  }

  let mut input = article("Tag Order");
  input.tags = vec![plain.id, section.id];
  let created = ix.create(input).await.unwrap();

  let q = query::build(&by_id(created.id), ix.registry());
  let hits = ix.backend().search(&q).await.unwrap();
  assert_eq!(hits.len(), 1);

  let slugs: Vec<_> = hits[0]["tags"]
    .as_array()
    .unwrap()
    .iter()
    .map(|t| t["slug"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(slugs, vec!["subtag", "taga"]);
}

#[tokio::test]
async fn unindexed_content_never_reaches_the_backend() {
  let ix = indexed_store().await;

  let mut input = article("Shadow");
  input.indexed = false;
  let created = ix.create(input).await.unwrap();

  assert!(ix.backend().is_empty());

  // Updates are suppressed too.
  let mut edited = ix.store().get_content(created.id).await.unwrap().unwrap();
  edited.title = "Still Shadow".into();
  ix.update(edited).await.unwrap();
  assert!(ix.backend().is_empty());
}

#[tokio::test]
async fn delete_with_missing_index_document_is_ok() {
  let ix = indexed_store().await;

  let mut input = article("Unseen");
  input.indexed = false;
  let created = ix.create(input).await.unwrap();

  // No index document was ever written; the delete must still succeed.
  assert!(ix.delete(created.id).await.unwrap());
  assert!(ix.store().get_content(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_the_index_document() {
  let ix = indexed_store().await;
  let created = ix.create(article("Doomed")).await.unwrap();
  assert_eq!(ix.backend().len(), 1);

  assert!(ix.delete(created.id).await.unwrap());
  assert!(ix.backend().is_empty());
}

#[tokio::test]
async fn replace_tags_pushes_partial_update() {
  let ix = indexed_store().await;
  let tag = ix
    .store()
    .create_tag("Late Addition".into(), TagKind::Tag)
    .await
    .unwrap();

  let created = ix.create(article("Partial")).await.unwrap();
  ix.replace_tags(created.id, vec![tag.id]).await.unwrap();

  let doc = ix
    .backend()
    .fetch("content_article", created.id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(doc["tags"][0]["slug"], "late-addition");
  // The rest of the document was not re-projected.
  assert_eq!(doc["title"], "Partial");

  // The relational side moved with it.
  let fetched = ix.store().get_content(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.tags, vec![tag.id]);
}

#[tokio::test]
async fn fetch_readonly_revives_from_the_index_alone() {
  let ix = indexed_store().await;
  let created = ix.create(article("Readable")).await.unwrap();

  // Remove the relational row behind the synchronizer's back; the
  // read-only path must not notice.
  ix.store().delete_content(created.id).await.unwrap();

  let revived = ix.fetch_readonly(created.id).await.unwrap().unwrap();
  assert_eq!(revived.title, "Readable");
  assert_eq!(revived.status, PubStatus::Draft);
  assert!(revived.url.is_some());

  assert!(ix.fetch_readonly(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn reindex_all_rebuilds_a_cold_backend() {
  let s = store().await;
  for i in 0..4 {
    s.create_content(article(&format!("Piece {i}"))).await.unwrap();
  }
  let mut hidden = article("Hidden");
  hidden.indexed = false;
  s.create_content(hidden).await.unwrap();

  let ix = IndexedStore::new(
    s,
    masthead_search::memory::MemoryIndex::new(),
    Arc::new(SiteRoutes::new("https://example.com")),
  );

  let indexed = ix.reindex_all().await.unwrap();
  assert_eq!(indexed, 4);
  assert_eq!(ix.backend().len(), 4);
}
