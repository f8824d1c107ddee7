//! The document projector.
//!
//! Pure and deterministic: given a hydrated content row and a projection
//! context (URL resolver + tag usage counts), produce the [`ContentDoc`]
//! the index stores. No I/O happens here.

use std::collections::HashMap;

use masthead_core::content::HydratedContent;
use masthead_core::taxonomy::Tag;
use uuid::Uuid;

use crate::{
  Result,
  document::{AuthorDoc, ContentDoc, FeatureTypeDoc, TagDoc},
  urls::UrlResolver,
};

/// Weight offset pushing non-base tag kinds (sections) ahead of every plain
/// tag regardless of usage counts.
const SUBTYPE_WEIGHT: u64 = 100_000;

/// Inputs the projector needs beyond the row itself.
pub struct ProjectionContext<'a> {
  pub urls:      &'a dyn UrlResolver,
  /// Content rows per tag id; missing entries count as zero.
  pub tag_usage: &'a HashMap<Uuid, u64>,
}

/// Project a hydrated content row into its index document.
pub fn project(
  hydrated: &HydratedContent,
  ctx: &ProjectionContext<'_>,
) -> Result<ContentDoc> {
  let content = &hydrated.content;

  Ok(ContentDoc {
    id:            content.id,
    doc_type:      content.doc_type().to_owned(),
    published:     content.published,
    last_modified: content.last_modified,
    title:         content.title.clone(),
    slug:          content.slug.clone(),
    description:   content.description.clone(),
    subhead:       content.subhead.clone(),
    status:        content.status(),
    url:           ctx.urls.absolute_url(content),
    tags:          project_tags(&hydrated.tags, ctx.tag_usage),
    authors:       hydrated.authors.iter().map(project_author).collect(),
    feature_type:  hydrated.feature_type.as_ref().map(|ft| FeatureTypeDoc {
      name: ft.name.clone(),
      slug: ft.slug.clone(),
    }),
    body:          content.body.to_json()?,
  })
}

/// Project and order the tag list alone. The synchronizer uses this for
/// partial updates when only the tag set changed.
///
/// Ordering is descending by `subtype-offset + usage count`: tag subtypes
/// (sections) always sort ahead of plain tags, and within each class more
/// heavily used tags come first. Ties keep their input order.
pub fn project_tags(tags: &[Tag], usage: &HashMap<Uuid, u64>) -> Vec<TagDoc> {
  let mut docs: Vec<(u64, TagDoc)> = tags
    .iter()
    .map(|tag| {
      let base = if tag.kind.is_base() { 0 } else { SUBTYPE_WEIGHT };
      let weight = base + usage.get(&tag.id).copied().unwrap_or(0);
      (weight, TagDoc {
        id:       tag.id,
        doc_type: tag.kind.doc_type().to_owned(),
        name:     tag.name.clone(),
        slug:     tag.slug.clone(),
      })
    })
    .collect();

  docs.sort_by(|a, b| b.0.cmp(&a.0));
  docs.into_iter().map(|(_, doc)| doc).collect()
}

fn project_author(author: &masthead_core::taxonomy::Author) -> AuthorDoc {
  AuthorDoc {
    id:         author.id,
    username:   author.username.clone(),
    first_name: author.first_name.clone(),
    last_name:  author.last_name.clone(),
  }
}
