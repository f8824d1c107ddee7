//! Search-index integration for Masthead content.
//!
//! Four concerns live here, all pure except where they talk to an
//! [`backend::IndexBackend`]:
//!
//! - **Projection** ([`project`]) — turning a hydrated content row into the
//!   denormalized document the index stores.
//! - **Synchronization** ([`sync::IndexedStore`]) — an explicit post-write
//!   hook that keeps the index in step with the relational store.
//! - **Query building** ([`query`]) — structured filter parameters composed
//!   into an opaque, refinable [`query::IndexQuery`].
//! - **Read-only reconstruction** ([`readonly`]) — rehydrating display
//!   objects straight from index documents, bypassing the relational store.

pub mod backend;
pub mod document;
pub mod error;
pub mod memory;
pub mod project;
pub mod query;
pub mod readonly;
pub mod recirc;
pub mod sync;
pub mod urls;

pub use document::DocTypeRegistry;
pub use error::{Error, Result};
pub use project::project;
