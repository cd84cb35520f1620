//! Core domain types for docdex documentation corpora.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocdexError, Result};

/// Language label for pages whose content applies to every supported
/// language (e.g. conceptual docs with per-language tabs).
pub const LANGUAGE_ALL: &str = "All";

/// Minimum extracted content length for a page to be worth indexing.
/// Pages at or below this are treated as empty shells and discarded.
pub const MIN_CONTENT_LEN: usize = 100;

/// Default maximum length of a `content_preview` excerpt.
pub const PREVIEW_MAX_LEN: usize = 300;

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// A single indexed documentation page, immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Original page URL.
    pub url: String,
    /// Page title (never empty — untitled pages are discarded at crawl time).
    pub title: String,
    /// Documentation section label (e.g. "Command-Based Programming").
    pub section: String,
    /// Programming language label, or [`LANGUAGE_ALL`].
    pub language: String,
    /// Normalized plain-text content.
    pub content: String,
    /// Bounded-length excerpt ending at a sentence or word boundary.
    pub content_preview: String,
}

impl PageRecord {
    /// Whether this page applies to `language` (exact match or the
    /// all-languages sentinel). A `None` filter matches everything.
    pub fn matches_language(&self, language: Option<&str>) -> bool {
        match language {
            Some(lang) => self.language == lang || self.language == LANGUAGE_ALL,
            None => true,
        }
    }
}

// ---------------------------------------------------------------------------
// IndexArtifact
// ---------------------------------------------------------------------------

/// The persisted output of one completed crawl: one artifact per
/// (source, version) pair. Never mutated in place — a rebuild produces a
/// new artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexArtifact {
    /// Source identifier (e.g. "wpilib", "rev").
    pub vendor: String,
    /// Version label the crawl was run against.
    pub version: String,
    /// When the crawl completed.
    pub built_at: DateTime<Utc>,
    /// All retained page records.
    pub pages: Vec<PageRecord>,
}

impl IndexArtifact {
    /// Load an artifact from a JSON file.
    ///
    /// A missing file is an `Io` error; callers that want missing artifacts
    /// to contribute zero records should check existence (or match on the
    /// error) rather than treat it as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DocdexError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            DocdexError::validation(format!("invalid index artifact {}: {e}", path.display()))
        })
    }

    /// Write the artifact as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DocdexError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DocdexError::validation(format!("artifact serialization: {e}")))?;
        std::fs::write(path, json).map_err(|e| DocdexError::io(path, e))?;
        tracing::info!(path = %path.display(), pages = self.pages.len(), "saved index artifact");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Query-layer types
// ---------------------------------------------------------------------------

/// A single search hit returned by the query service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub section: String,
    /// Human-readable source name (e.g. "REV Robotics").
    pub vendor: String,
    pub language: String,
    pub version: String,
    pub content_preview: String,
    pub score: f64,
}

/// Full content of a documentation page fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub content: String,
    pub vendor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// When the page was fetched (RFC 3339).
    pub fetched_at: String,
}

/// A documentation section with its page count, for `list_sections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    pub vendor: String,
    pub page_count: usize,
}
