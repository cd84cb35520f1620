//! Source adapter trait and the built-in adapter registry.
//!
//! Each documentation source supplies one [`SourceAdapter`]: a URL
//! acceptance predicate, section/language classifiers, and optional
//! overrides of the default title/content/link extraction. The crawler
//! core is polymorphic over this capability set and performs no
//! source-specific logic itself.

mod rev;
mod wpilib;

use std::collections::HashSet;
use std::sync::Arc;

use scraper::{Html, Selector};
use url::Url;

pub use rev::RevAdapter;
pub use wpilib::WpilibAdapter;

use docdex_shared::LANGUAGE_ALL;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Capability set a documentation source supplies to the generic crawler.
pub trait SourceAdapter: Send + Sync {
    /// Unique identifier (e.g. "wpilib", "rev").
    fn source_id(&self) -> &'static str;

    /// Human-readable name (e.g. "REV Robotics").
    fn display_name(&self) -> &'static str;

    /// Base URL whose network authority bounds link traversal.
    fn base_url(&self) -> &Url;

    /// Documentation versions this source publishes.
    fn supported_versions(&self) -> &'static [&'static str];

    /// Programming languages this source documents.
    fn supported_languages(&self) -> &'static [&'static str];

    /// Seed URLs for a crawl of the given version.
    fn start_urls(&self, version: &str) -> Vec<Url>;

    /// Sole admission gate: whether a URL should be crawled at all.
    fn should_crawl(&self, url: &Url) -> bool;

    /// Documentation section label for a page.
    fn extract_section(&self, doc: &Html, url: &Url) -> String;

    /// Programming language label for a page. Multi-language pages report
    /// [`LANGUAGE_ALL`].
    fn extract_language(&self, doc: &Html, url: &Url) -> String;

    /// Page title. Default: document title with site-name suffix stripped,
    /// falling back to the first heading.
    fn extract_title(&self, doc: &Html, _url: &Url) -> Option<String> {
        docdex_extract::title_from_doc(doc)
    }

    /// Main content as normalized plain text.
    fn extract_content(&self, doc: &Html, _url: &Url) -> String {
        docdex_extract::content_from_doc(doc)
    }

    /// Outgoing links: resolved to absolute form, fragment stripped,
    /// restricted to the same network authority as [`Self::base_url`],
    /// deduplicated in document order.
    fn extract_links(&self, doc: &Html, page_url: &Url) -> Vec<Url> {
        let link_sel = Selector::parse("a[href]").expect("valid selector");
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for el in doc.select(&link_sel) {
            let Some(href) = el.value().attr("href") else {
                continue;
            };
            if href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
            {
                continue;
            }

            let Ok(mut resolved) = page_url.join(href) else {
                continue;
            };
            resolved.set_fragment(None);

            if resolved.authority() != self.base_url().authority() {
                continue;
            }
            if seen.insert(resolved.to_string()) {
                links.push(resolved);
            }
        }

        links
    }

    /// Whether this source handles the given URL, for fetch routing.
    fn owns_url(&self, url: &str) -> bool {
        url.to_lowercase()
            .starts_with(&self.base_url().as_str().to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Static mapping from source identifier to adapter, built at startup.
pub struct SourceRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Create a registry with all built-in adapters.
    pub fn new() -> Self {
        Self {
            adapters: vec![Arc::new(WpilibAdapter::new()), Arc::new(RevAdapter::new())],
        }
    }

    /// Look up an adapter by source identifier.
    pub fn get(&self, source_id: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.source_id() == source_id)
            .cloned()
    }

    /// All registered adapters, in registration order.
    pub fn all(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Find the adapter that owns a URL, for fetch routing.
    pub fn adapter_for_url(&self, url: &str) -> Option<Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.owns_url(url)).cloned()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared classifier helpers
// ---------------------------------------------------------------------------

/// Lowercased text of the elements matching `selector`, joined by spaces.
pub(crate) fn selected_text(doc: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    doc.select(&sel)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Truncate a string to at most `max` bytes without splitting a character.
pub(crate) fn truncate_to_boundary(text: &mut String, max: usize) {
    if text.len() > max {
        let cut = (0..=max)
            .rev()
            .find(|i| text.is_char_boundary(*i))
            .unwrap_or(0);
        text.truncate(cut);
    }
}

/// Classify a page's language from detected language markers. More than one
/// marker means the page applies to all languages.
pub(crate) fn classify_language(has_java: bool, has_python: bool, has_cpp: bool) -> String {
    match (has_java, has_python, has_cpp) {
        (true, false, false) => "Java".to_string(),
        (false, true, false) => "Python".to_string(),
        (false, false, true) => "C++".to_string(),
        _ => LANGUAGE_ALL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_known_sources() {
        let registry = SourceRegistry::new();
        assert!(registry.get("wpilib").is_some());
        assert!(registry.get("rev").is_some());
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.all().len(), 2);
    }

    #[test]
    fn registry_routes_urls_to_owner() {
        let registry = SourceRegistry::new();

        let adapter = registry
            .adapter_for_url("https://docs.wpilib.org/en/stable/docs/software/index.html")
            .expect("wpilib owns its docs");
        assert_eq!(adapter.source_id(), "wpilib");

        let adapter = registry
            .adapter_for_url("https://docs.revrobotics.com/brushless/spark-max/overview")
            .expect("rev owns its docs");
        assert_eq!(adapter.source_id(), "rev");

        assert!(registry.adapter_for_url("https://example.com/page").is_none());
    }

    #[test]
    fn classify_language_multi_marker_is_all() {
        assert_eq!(classify_language(true, true, false), LANGUAGE_ALL);
        assert_eq!(classify_language(true, true, true), LANGUAGE_ALL);
        assert_eq!(classify_language(false, false, false), LANGUAGE_ALL);
        assert_eq!(classify_language(true, false, false), "Java");
        assert_eq!(classify_language(false, true, false), "Python");
        assert_eq!(classify_language(false, false, true), "C++");
    }
}
