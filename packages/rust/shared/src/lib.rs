//! Shared types, error model, and configuration for docdex.
//!
//! This crate is the foundation depended on by all other docdex crates.
//! It provides:
//! - [`DocdexError`] — the unified error type
//! - Domain types ([`PageRecord`], [`IndexArtifact`], [`SearchHit`], [`PageContent`])
//! - Configuration ([`AppConfig`], [`CrawlLimits`], [`CacheSettings`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheSectionConfig, CacheSettings, CrawlLimits, CrawlSectionConfig,
    DefaultsConfig, SourceEntry, config_dir, config_file_path, data_dir, init_config,
    load_config, load_config_from,
};
pub use error::{DocdexError, Result};
pub use types::{
    IndexArtifact, LANGUAGE_ALL, MIN_CONTENT_LEN, PREVIEW_MAX_LEN, PageContent, PageRecord,
    SearchHit, SectionSummary,
};
