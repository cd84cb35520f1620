//! HTML content extraction: main-region selection, text rendering, titles,
//! and preview excerpts.
//!
//! Documentation pages carry heavy chrome (navigation, sidebars, footers).
//! This crate locates the main content region, renders it to normalized
//! plain text with lightweight structure markers, and derives titles and
//! bounded previews from the result.

mod render;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use render::{collapsed_text, render_element};

/// Structural selectors tried in priority order when locating the main
/// content region.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    r#"[role="main"]"#,
    ".main-content",
    ".content",
    ".documentation",
    ".doc-content",
    "#content",
    "#main-content",
];

/// Minimum visible characters for a selector candidate to count as the
/// main region. Guards against empty shells that match the selector.
const MIN_REGION_CHARS: usize = 100;

/// Site-name separators stripped from the tail of a document title.
const TITLE_SEPARATORS: &[&str] = &[" — ", " - ", " | ", " · "];

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Extract the main content of a page as normalized plain text.
///
/// Returns an empty string when the page has no renderable content.
pub fn extract_content(html: &str, url: &str) -> String {
    let doc = Html::parse_document(html);
    let text = content_from_doc(&doc);
    debug!(url, len = text.len(), "extracted content");
    text
}

/// Like [`extract_content`], for callers that already hold a parsed document.
pub fn content_from_doc(doc: &Html) -> String {
    let region = find_main_region(doc);

    match region {
        Some(el) => render_element(el),
        None => {
            // No selector produced a substantial region; fall back to <body>,
            // then to the whole document.
            let body_sel = Selector::parse("body").expect("valid selector");
            match doc.select(&body_sel).next() {
                Some(body) => render_element(body),
                None => render_element(doc.root_element()),
            }
        }
    }
}

/// Try the priority-ordered content selectors, accepting the first candidate
/// with enough visible text.
fn find_main_region(doc: &Html) -> Option<ElementRef<'_>> {
    first_substantial(doc, CONTENT_SELECTORS)
}

/// Render the first of `selectors` that matches with enough visible text.
///
/// For source adapters that override the default content extraction with a
/// site-specific selector chain.
pub fn render_with_selectors(doc: &Html, selectors: &[&str]) -> Option<String> {
    first_substantial(doc, selectors).map(render_element)
}

fn first_substantial<'a>(doc: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    for sel_str in selectors {
        let Ok(sel) = Selector::parse(sel_str) else {
            continue;
        };
        if let Some(el) = doc.select(&sel).next() {
            if collapsed_text(el).len() > MIN_REGION_CHARS {
                return Some(el);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

/// Extract the page title: the `<title>` text with trailing site-name
/// separators cut off, falling back to the first `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    title_from_doc(&doc)
}

/// Like [`extract_title`], for callers that already hold a parsed document.
pub fn title_from_doc(doc: &Html) -> Option<String> {
    let title_sel = Selector::parse("title").expect("valid selector");
    if let Some(el) = doc.select(&title_sel).next() {
        let mut title = el.text().collect::<String>().trim().to_string();
        for sep in TITLE_SEPARATORS {
            if let Some(idx) = title.find(sep) {
                title.truncate(idx);
                title = title.trim().to_string();
            }
        }
        if !title.is_empty() {
            return Some(title);
        }
    }

    let h1_sel = Selector::parse("h1").expect("valid selector");
    doc.select(&h1_sel)
        .next()
        .map(collapsed_text)
        .filter(|t| !t.is_empty())
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Truncate `text` to at most `max_len` characters, preferring a sentence
/// boundary past 50% of the budget, then a word boundary past 70% (with an
/// ellipsis), then a hard cut.
pub fn extract_preview(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }

    // Back up to a char boundary so multi-byte text never splits.
    let cut = (0..=max_len)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    let truncated = &text[..cut];

    for sep in [". ", ".\n", "! ", "? "] {
        if let Some(idx) = truncated.rfind(sep) {
            if idx > max_len / 2 {
                return truncated[..idx + 1].trim().to_string();
            }
        }
    }

    if let Some(idx) = truncated.rfind(' ') {
        if idx > max_len * 7 / 10 {
            return format!("{}...", truncated[..idx].trim());
        }
    }

    format!("{}...", truncated.trim())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
