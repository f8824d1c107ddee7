//! Slug derivation.
//!
//! Slugs are derived deterministically from display text: markup is stripped
//! first, then the text is lowercased, punctuation is dropped, and whitespace
//! runs collapse to single hyphens. The result is truncated to
//! [`SLUG_MAX_LEN`] bytes without leaving a trailing hyphen.

/// Maximum slug length in bytes, matching the database column.
pub const SLUG_MAX_LEN: usize = 50;

/// Derive a slug from `text`.
///
/// `"Hello, <b>World</b>!"` becomes `"hello-world"`.
pub fn slugify(text: &str) -> String {
  let stripped = strip_markup(text);
  let mut slug = String::with_capacity(stripped.len());
  let mut pending_sep = false;

  for ch in stripped.chars() {
    if ch.is_ascii_alphanumeric() {
      if pending_sep && !slug.is_empty() {
        slug.push('-');
      }
      pending_sep = false;
      slug.push(ch.to_ascii_lowercase());
    } else if ch.is_whitespace() || ch == '-' || ch == '_' {
      pending_sep = true;
    }
    // Any other character (punctuation, non-ASCII) is dropped without
    // acting as a separator, so "don't" slugifies to "dont".
  }

  truncate_slug(slug)
}

/// Remove `<…>` spans from `text`. An unterminated `<` swallows the rest of
/// the input, which is the safe direction for untrusted titles.
fn strip_markup(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut in_tag = false;

  for ch in text.chars() {
    match ch {
      '<' => in_tag = true,
      '>' if in_tag => in_tag = false,
      _ if !in_tag => out.push(ch),
      _ => {}
    }
  }

  out
}

/// Enforce [`SLUG_MAX_LEN`], cutting on a character boundary and trimming
/// any hyphen the cut exposes.
fn truncate_slug(mut slug: String) -> String {
  if slug.len() > SLUG_MAX_LEN {
    let mut cut = SLUG_MAX_LEN;
    while !slug.is_char_boundary(cut) {
      cut -= 1;
    }
    slug.truncate(cut);
  }
  while slug.ends_with('-') {
    slug.pop();
  }
  slug
}
