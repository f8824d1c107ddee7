//! Recirculation widgets — saved searches attached to content.
//!
//! A recirc widget persists its criteria as raw JSON (editorial tools write
//! it) and executes them through the query builder when the page renders.
//! Saved criteria are cleaned before use: editorial tooling is allowed to
//! leave `null` holes in list parameters, and those must not surface as
//! filter terms.

use serde_json::Value;
use uuid::Uuid;

use crate::{
  Result,
  backend::IndexBackend,
  document::DocTypeRegistry,
  query::{self, Clause, SearchCriteria},
  readonly::ReadOnlyContent,
};

/// How many pieces a recirc widget shows by default.
pub const DEFAULT_SLOTS: usize = 3;

/// A saved recirculation query owned by a piece of content.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecircQuery {
  pub content_id: Uuid,
  /// Raw criteria as stored; see [`RecircQuery::clean`].
  pub query:      Value,
}

impl RecircQuery {
  pub fn new(content_id: Uuid, query: Value) -> Self {
    Self { content_id, query }
  }

  /// Strip `null` entries from every list parameter in the stored query.
  /// Called before persisting and again before execution, since older rows
  /// were saved before cleaning existed.
  pub fn clean(&mut self) {
    if let Value::Object(map) = &mut self.query {
      for value in map.values_mut() {
        if let Value::Array(items) = value {
          items.retain(|item| !item.is_null());
        }
      }
    }
  }

  /// The stored query decoded into criteria. Unknown keys are ignored.
  pub fn criteria(&self) -> Result<SearchCriteria> {
    let mut cleaned = self.clone();
    cleaned.clean();
    Ok(serde_json::from_value(cleaned.query)?)
  }

  /// Execute the saved criteria and return up to `slots` revived results.
  /// The owning piece of content is excluded so a widget never recirculates
  /// its own page.
  pub async fn content<B: IndexBackend>(
    &self,
    backend: &B,
    registry: &DocTypeRegistry,
    slots: usize,
  ) -> Result<Vec<ReadOnlyContent>> {
    let built = query::build(&self.criteria()?, registry)
      .and(Clause::Not(Box::new(Clause::Id(self.content_id))))
      .limit(slots);

    let raws = backend.search(&built).await?;
    Ok(registry.revive_all(&raws))
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn clean_strips_null_list_entries() {
    let mut rq = RecircQuery::new(
      Uuid::new_v4(),
      json!({ "tags": ["politics", null, "satire"], "query": null }),
    );
    rq.clean();
    assert_eq!(rq.query["tags"], json!(["politics", "satire"]));
  }

  #[test]
  fn criteria_decodes_cleaned_query_ignoring_unknown_keys() {
    let rq = RecircQuery::new(
      Uuid::new_v4(),
      json!({
        "tags": ["politics", null],
        "pinned_ids": [1, 2, 3],
      }),
    );
    let criteria = rq.criteria().unwrap();
    assert_eq!(criteria.tags, vec!["politics".to_owned()]);
    assert!(criteria.query.is_none());
  }
}
