//! URL generation seam.
//!
//! The projector needs an absolute URL for each document but URL routing
//! belongs to the site, not to this crate. A missing route yields `None`,
//! never an error.

use masthead_core::content::{Content, ContentBody};

/// Builds the public URL for a piece of content.
pub trait UrlResolver: Send + Sync {
  fn absolute_url(&self, content: &Content) -> Option<String>;
}

/// Route table for the standard site layout:
/// `{base}/{section}/{slug}-{id}`.
#[derive(Debug, Clone)]
pub struct SiteRoutes {
  base: String,
}

impl SiteRoutes {
  /// `base` should carry no trailing slash (one is stripped if present).
  pub fn new(base: impl Into<String>) -> Self {
    let mut base = base.into();
    while base.ends_with('/') {
      base.pop();
    }
    Self { base }
  }

  fn section(content: &Content) -> &'static str {
    match content.body {
      ContentBody::Article(_) => "articles",
      ContentBody::Poll(_) => "polls",
      ContentBody::Video(_) => "videos",
    }
  }
}

impl UrlResolver for SiteRoutes {
  fn absolute_url(&self, content: &Content) -> Option<String> {
    if content.slug.is_empty() {
      return None;
    }
    Some(format!(
      "{}/{}/{}-{}",
      self.base,
      Self::section(content),
      content.slug,
      content.id
    ))
  }
}

/// Resolver with no routes at all; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoutes;

impl UrlResolver for NoRoutes {
  fn absolute_url(&self, _content: &Content) -> Option<String> { None }
}
