//! Core types and trait definitions for the Masthead content platform.
//!
//! This crate is deliberately free of HTTP, database, and search-index
//! dependencies. All other crates depend on it; it depends on nothing
//! proprietary.

pub mod content;
pub mod contribution;
pub mod error;
pub mod slug;
pub mod store;
pub mod taxonomy;

pub use error::{Error, Result};
