//! [`SqliteStore`] — the SQLite implementation of [`ContentStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use masthead_core::{
  content::{Content, HydratedContent, NewContent},
  slug::slugify,
  store::ContentStore,
  taxonomy::{Author, FeatureType, NewAuthor, Tag, TagKind},
};

use crate::{
  Error, Result,
  encode::{
    RawAuthor, RawContent, RawFeatureType, RawTag, decode_uuid, encode_dt,
    encode_tag_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Masthead content store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. The store
/// performs relational writes only; index synchronization is the caller's
/// job (see `masthead-search`).
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Content`] and its association rows in one
  /// transaction. `replace` first clears any existing row with this id.
  async fn write_content(&self, content: &Content, replace: bool) -> Result<()> {
    let id_str          = encode_uuid(content.id);
    let doc_type        = content.doc_type().to_owned();
    let published_str   = content.published.map(encode_dt);
    let last_mod_str    = encode_dt(content.last_modified);
    let title           = content.title.clone();
    let slug            = content.slug.clone();
    let description     = content.description.clone();
    let subhead         = content.subhead.clone();
    let feature_type_str = content.feature_type.map(encode_uuid);
    let indexed         = content.indexed;
    let body_json       = content.body.to_json().map_err(Error::Core)?.to_string();
    let tag_strs: Vec<String> =
      content.tags.iter().copied().map(encode_uuid).collect();
    let author_strs: Vec<String> =
      content.authors.iter().copied().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if replace {
          tx.execute(
            "DELETE FROM content_tags WHERE content_id = ?1",
            rusqlite::params![id_str],
          )?;
          tx.execute(
            "DELETE FROM content_authors WHERE content_id = ?1",
            rusqlite::params![id_str],
          )?;
          tx.execute(
            "DELETE FROM content WHERE content_id = ?1",
            rusqlite::params![id_str],
          )?;
        }

        tx.execute(
          "INSERT INTO content (
             content_id, doc_type, published, last_modified, title, slug,
             description, subhead, feature_type_id, indexed, body_json
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            doc_type,
            published_str,
            last_mod_str,
            title,
            slug,
            description,
            subhead,
            feature_type_str,
            indexed,
            body_json,
          ],
        )?;

        for tag_str in &tag_strs {
          tx.execute(
            "INSERT INTO content_tags (content_id, tag_id) VALUES (?1, ?2)",
            rusqlite::params![id_str, tag_str],
          )?;
        }
        for (position, author_str) in author_strs.iter().enumerate() {
          tx.execute(
            "INSERT INTO content_authors (content_id, author_id, position)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id_str, author_str, position as i64],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a raw content row plus its association id lists.
  async fn fetch_raw(
    &self,
    id: Uuid,
  ) -> Result<Option<(RawContent, Vec<String>, Vec<String>)>> {
    let id_str = encode_uuid(id);

    let fetched = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            "SELECT content_id, doc_type, published, last_modified, title,
                    slug, description, subhead, feature_type_id, indexed,
                    body_json
             FROM content WHERE content_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawContent {
                content_id:      row.get(0)?,
                doc_type:        row.get(1)?,
                published:       row.get(2)?,
                last_modified:   row.get(3)?,
                title:           row.get(4)?,
                slug:            row.get(5)?,
                description:     row.get(6)?,
                subhead:         row.get(7)?,
                feature_type_id: row.get(8)?,
                indexed:         row.get(9)?,
                body_json:       row.get(10)?,
              })
            },
          )
          .optional()?;

        let Some(raw) = raw else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT tag_id FROM content_tags WHERE content_id = ?1",
        )?;
        let tags = stmt
          .query_map(rusqlite::params![id_str], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT author_id FROM content_authors
           WHERE content_id = ?1 ORDER BY position",
        )?;
        let authors = stmt
          .query_map(rusqlite::params![id_str], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((raw, tags, authors)))
      })
      .await?;

    Ok(fetched)
  }

}

/// Decode the output of [`SqliteStore::fetch_raw`] into a [`Content`].
fn decode_fetched(
  fetched: Option<(RawContent, Vec<String>, Vec<String>)>,
) -> Result<Option<Content>> {
  let Some((raw, tag_strs, author_strs)) = fetched else {
    return Ok(None);
  };
  let tags = tag_strs
    .iter()
    .map(|s| decode_uuid(s))
    .collect::<Result<Vec<_>>>()?;
  let authors = author_strs
    .iter()
    .map(|s| decode_uuid(s))
    .collect::<Result<Vec<_>>>()?;
  Ok(Some(raw.into_content(tags, authors)?))
}

// ─── ContentStore impl ───────────────────────────────────────────────────────

impl ContentStore for SqliteStore {
  type Error = Error;

  async fn create_content(&self, input: NewContent) -> Result<Content> {
    let content = Content {
      id:            Uuid::new_v4(),
      published:     input.published,
      last_modified: Utc::now(),
      slug:          input.resolved_slug(),
      title:         input.title,
      description:   input.description,
      subhead:       input.subhead,
      feature_type:  input.feature_type,
      tags:          input.tags,
      authors:       input.authors,
      indexed:       input.indexed,
      body:          input.body,
    };
    self.write_content(&content, false).await?;
    Ok(content)
  }

  async fn update_content(&self, mut content: Content) -> Result<Content> {
    if self.fetch_raw(content.id).await?.is_none() {
      return Err(Error::ContentNotFound(content.id));
    }

    content.last_modified = Utc::now();
    if content.slug.is_empty() {
      content.slug = slugify(&content.title);
    }
    self.write_content(&content, true).await?;
    Ok(content)
  }

  async fn get_content(&self, id: Uuid) -> Result<Option<Content>> {
    let fetched = self.fetch_raw(id).await?;
    decode_fetched(fetched)
  }

  async fn hydrate(&self, id: Uuid) -> Result<Option<HydratedContent>> {
    let Some(content) = self.get_content(id).await? else {
      return Ok(None);
    };

    let tags = self.get_tags(content.tags.clone()).await?;

    let author_strs: Vec<String> =
      content.authors.iter().copied().map(encode_uuid).collect();
    let raw_authors: Vec<RawAuthor> = self
      .conn
      .call(move |conn| {
        let mut authors = Vec::with_capacity(author_strs.len());
        let mut stmt = conn.prepare(
          "SELECT author_id, username, first_name, last_name
           FROM authors WHERE author_id = ?1",
        )?;
        for author_str in &author_strs {
          let raw = stmt
            .query_row(rusqlite::params![author_str], |row| {
              Ok(RawAuthor {
                author_id:  row.get(0)?,
                username:   row.get(1)?,
                first_name: row.get(2)?,
                last_name:  row.get(3)?,
              })
            })
            .optional()?;
          if let Some(raw) = raw {
            authors.push(raw);
          }
        }
        Ok(authors)
      })
      .await?;
    let authors = raw_authors
      .into_iter()
      .map(RawAuthor::into_author)
      .collect::<Result<Vec<Author>>>()?;

    let feature_type = match content.feature_type {
      None => None,
      Some(ft_id) => {
        let ft_str = encode_uuid(ft_id);
        let raw = self
          .conn
          .call(move |conn| {
            let raw = conn
              .query_row(
                "SELECT feature_type_id, name, slug
                 FROM feature_types WHERE feature_type_id = ?1",
                rusqlite::params![ft_str],
                |row| {
                  Ok(RawFeatureType {
                    feature_type_id: row.get(0)?,
                    name:            row.get(1)?,
                    slug:            row.get(2)?,
                  })
                },
              )
              .optional()?;
            Ok(raw)
          })
          .await?;
        raw.map(RawFeatureType::into_feature_type).transpose()?
      }
    };

    Ok(Some(HydratedContent { content, tags, authors, feature_type }))
  }

  async fn delete_content(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let deleted = self
      .conn
      .call(move |conn| {
        // Foreign keys are ON, so association rows cascade.
        let n = conn.execute(
          "DELETE FROM content WHERE content_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn set_tags(&self, id: Uuid, tag_ids: Vec<Uuid>) -> Result<()> {
    if self.fetch_raw(id).await?.is_none() {
      return Err(Error::ContentNotFound(id));
    }

    let id_str = encode_uuid(id);
    let tag_strs: Vec<String> =
      tag_ids.into_iter().map(encode_uuid).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM content_tags WHERE content_id = ?1",
          rusqlite::params![id_str],
        )?;
        for tag_str in &tag_strs {
          tx.execute(
            "INSERT INTO content_tags (content_id, tag_id) VALUES (?1, ?2)",
            rusqlite::params![id_str, tag_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_content_ids(&self) -> Result<Vec<Uuid>> {
    let id_strs: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT content_id FROM content ORDER BY content_id")?;
        let ids = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
      })
      .await?;
    id_strs.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Reference data ────────────────────────────────────────────────────

  async fn create_tag(&self, name: String, kind: TagKind) -> Result<Tag> {
    let tag = Tag::new(name, kind);

    let id_str   = encode_uuid(tag.id);
    let tag_name = tag.name.clone();
    let slug     = tag.slug.clone();
    let kind_str = encode_tag_kind(tag.kind).to_owned();

    let taken = self.slug_taken("tags", slug.clone()).await?;
    if taken {
      return Err(Error::DuplicateSlug(tag.slug));
    }

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tags (tag_id, name, slug, kind)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, tag_name, slug, kind_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(tag)
  }

  async fn get_tags(&self, ids: Vec<Uuid>) -> Result<Vec<Tag>> {
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        let mut tags = Vec::with_capacity(id_strs.len());
        let mut stmt = conn
          .prepare("SELECT tag_id, name, slug, kind FROM tags WHERE tag_id = ?1")?;
        for id_str in &id_strs {
          let raw = stmt
            .query_row(rusqlite::params![id_str], |row| {
              Ok(RawTag {
                tag_id: row.get(0)?,
                name:   row.get(1)?,
                slug:   row.get(2)?,
                kind:   row.get(3)?,
              })
            })
            .optional()?;
          if let Some(raw) = raw {
            tags.push(raw);
          }
        }
        Ok(tags)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn tag_usage(&self) -> Result<HashMap<Uuid, u64>> {
    let counts: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT tag_id, COUNT(*) FROM content_tags GROUP BY tag_id",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut usage = HashMap::with_capacity(counts.len());
    for (id_str, count) in counts {
      usage.insert(decode_uuid(&id_str)?, count.max(0) as u64);
    }
    Ok(usage)
  }

  async fn create_feature_type(&self, name: String) -> Result<FeatureType> {
    let ft = FeatureType::new(name);

    let taken = self.slug_taken("feature_types", ft.slug.clone()).await?;
    if taken {
      return Err(Error::DuplicateSlug(ft.slug));
    }

    let id_str  = encode_uuid(ft.id);
    let ft_name = ft.name.clone();
    let slug    = ft.slug.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feature_types (feature_type_id, name, slug)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, ft_name, slug],
        )?;
        Ok(())
      })
      .await?;
    Ok(ft)
  }

  async fn create_author(&self, input: NewAuthor) -> Result<Author> {
    let author = Author {
      id:         Uuid::new_v4(),
      username:   input.username,
      first_name: input.first_name,
      last_name:  input.last_name,
    };

    let id_str     = encode_uuid(author.id);
    let username   = author.username.clone();
    let first_name = author.first_name.clone();
    let last_name  = author.last_name.clone();

    let username_check = username.clone();
    let taken: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM authors WHERE username = ?1",
            rusqlite::params![username_check],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        Ok(taken)
      })
      .await?;
    if taken {
      return Err(Error::DuplicateUsername(author.username));
    }

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO authors (author_id, username, first_name, last_name)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, username, first_name, last_name],
        )?;
        Ok(())
      })
      .await?;
    Ok(author)
  }
}

impl SqliteStore {
  /// Whether a slug already exists in the given reference table.
  async fn slug_taken(&self, table: &'static str, slug: String) -> Result<bool> {
    let taken = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT 1 FROM {table} WHERE slug = ?1");
        let taken = conn
          .query_row(&sql, rusqlite::params![slug], |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        Ok(taken)
      })
      .await?;
    Ok(taken)
  }
}
