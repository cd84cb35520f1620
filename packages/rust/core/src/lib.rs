//! Query-serving core: loads index artifacts and serves search/fetch/section
//! queries over every configured documentation source.
//!
//! The outward-facing tool-invocation protocol is the host's concern; this
//! crate exposes exactly the operations that layer consumes:
//! [`DocService::search`], [`DocService::fetch_page`], and
//! [`DocService::list_sections`].

pub mod service;

pub use service::{DocService, IndexedPage};
