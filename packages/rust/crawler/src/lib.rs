//! Documentation crawling: source adapters and the bounded index builder.
//!
//! This crate provides:
//! - [`adapters`] — the [`SourceAdapter`] capability set, built-in adapters,
//!   and the startup [`SourceRegistry`]
//! - [`engine`] — the bounded, polite [`IndexBuilder`] that turns a source's
//!   seed URLs into an index artifact

pub mod adapters;
pub mod engine;

pub use adapters::{RevAdapter, SourceAdapter, SourceRegistry, WpilibAdapter};
pub use engine::{CrawlSummary, IndexBuilder};
