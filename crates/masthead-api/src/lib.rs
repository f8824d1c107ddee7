//! JSON REST API for Masthead.
//!
//! Exposes an axum [`Router`] backed by any
//! [`masthead_core::store::ContentStore`] /
//! [`masthead_search::backend::IndexBackend`] pair. Auth, TLS, and
//! transport concerns are the caller's responsibility.

pub mod content;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use masthead_core::store::ContentStore;
use masthead_search::{backend::IndexBackend, sync::IndexedStore};
use serde::Deserialize;

pub use error::ApiError;

/// Server configuration, deserialised from `config.toml` and the
/// `MASTHEAD_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  #[serde(default = "default_store_path")]
  pub store_path:    String,
  /// Base URL used when projecting absolute document URLs.
  #[serde(default = "default_site_base_url")]
  pub site_base_url: String,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> String { "masthead.db".into() }
fn default_site_base_url() -> String { "http://localhost:8080".into() }

/// Build a fully-materialised API router for `ix`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, B>(ix: Arc<IndexedStore<S, B>>) -> Router<()>
where
  S: ContentStore + 'static,
  B: IndexBackend + 'static,
{
  Router::new()
    .route(
      "/content",
      get(content::search::<S, B>).post(content::create::<S, B>),
    )
    .route(
      "/content/{id}",
      get(content::get_one::<S, B>)
        .put(content::update::<S, B>)
        .delete(content::delete::<S, B>),
    )
    .route("/content/{id}/tags", put(content::put_tags::<S, B>))
    .with_state(ix)
}
