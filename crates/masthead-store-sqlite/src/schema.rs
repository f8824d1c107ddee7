//! SQL schema for the Masthead SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS feature_types (
    feature_type_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    slug            TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS tags (
    tag_id TEXT PRIMARY KEY,
    name   TEXT NOT NULL,
    slug   TEXT NOT NULL UNIQUE,
    kind   TEXT NOT NULL     -- 'tag' | 'section'
);

CREATE TABLE IF NOT EXISTS authors (
    author_id  TEXT PRIMARY KEY,
    username   TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS content (
    content_id      TEXT PRIMARY KEY,
    doc_type        TEXT NOT NULL,   -- discriminant of the ContentBody variant
    published       TEXT,            -- ISO 8601 UTC; NULL means draft
    last_modified   TEXT NOT NULL,
    title           TEXT NOT NULL,
    slug            TEXT NOT NULL DEFAULT '',
    description     TEXT NOT NULL DEFAULT '',
    subhead         TEXT,
    feature_type_id TEXT REFERENCES feature_types(feature_type_id),
    indexed         INTEGER NOT NULL DEFAULT 1,
    body_json       TEXT NOT NULL    -- JSON payload (inner data only)
);

-- Association rows are owned by the content side: deleting content deletes
-- them, deleting reference data is refused while associations exist.
CREATE TABLE IF NOT EXISTS content_tags (
    content_id TEXT NOT NULL REFERENCES content(content_id) ON DELETE CASCADE,
    tag_id     TEXT NOT NULL REFERENCES tags(tag_id),
    PRIMARY KEY (content_id, tag_id)
);

CREATE TABLE IF NOT EXISTS content_authors (
    content_id TEXT NOT NULL REFERENCES content(content_id) ON DELETE CASCADE,
    author_id  TEXT NOT NULL REFERENCES authors(author_id),
    position   INTEGER NOT NULL DEFAULT 0,  -- byline order
    PRIMARY KEY (content_id, author_id)
);

CREATE INDEX IF NOT EXISTS content_published_idx ON content(published);
CREATE INDEX IF NOT EXISTS content_doc_type_idx  ON content(doc_type);
CREATE INDEX IF NOT EXISTS content_tags_tag_idx  ON content_tags(tag_id);

PRAGMA user_version = 1;
";
