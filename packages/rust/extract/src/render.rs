//! Structural HTML-to-text rendering.
//!
//! Walks the element tree, skipping non-content and boilerplate subtrees,
//! and renders the rest with lightweight structure markers: headings,
//! fenced code blocks, bullet lists, and pipe-delimited table rows.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

/// Tags removed entirely, including their content.
pub(crate) const REMOVE_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "form", "button", "input", "select",
    "textarea", "iframe", "noscript", "svg", "canvas", "video", "audio",
];

/// Class-name substrings that mark navigation/boilerplate containers.
/// Matched case-insensitively against each class token.
pub(crate) const BOILERPLATE_CLASSES: &[&str] = &[
    "nav",
    "navigation",
    "navbar",
    "sidebar",
    "menu",
    "footer",
    "header",
    "breadcrumb",
    "toc",
    "table-of-contents",
    "edit-page",
    "page-nav",
    "pagination",
    "social",
    "share",
    "advertisement",
    "banner",
    "cookie",
];

/// Whether an element should be skipped entirely during rendering.
pub(crate) fn is_skipped(el: &ElementRef<'_>) -> bool {
    let name = el.value().name();
    if REMOVE_TAGS.contains(&name) {
        return true;
    }
    is_boilerplate(el)
}

/// Whether any of the element's class tokens contains a boilerplate marker.
fn is_boilerplate(el: &ElementRef<'_>) -> bool {
    let Some(classes) = el.value().attr("class") else {
        return false;
    };
    let lowered = classes.to_lowercase();
    lowered.split_whitespace().any(|token| {
        BOILERPLATE_CLASSES
            .iter()
            .any(|pattern| token.contains(pattern))
    })
}

/// Render an element subtree into normalized text.
pub(crate) fn render_element(el: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    render_children(el, &mut parts);
    normalize_whitespace(&parts.join(" "))
}

/// Walk direct children, dispatching on tag kind.
fn render_children(el: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_skipped(&child_el) {
                    continue;
                }

                match child_el.value().name() {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let heading = collapsed_text(child_el);
                        if !heading.is_empty() {
                            parts.push(format!("\n\n## {heading}\n"));
                        }
                    }
                    "pre" => {
                        // Preformatted block: keep internal whitespace intact.
                        let code = raw_text(child_el);
                        if !code.trim().is_empty() {
                            parts.push(format!("\n```\n{code}\n```\n"));
                        }
                    }
                    // Inline code; code inside <pre> never reaches here
                    // because <pre> subtrees are rendered wholesale above.
                    "code" => {
                        parts.push(format!("`{}`", collapsed_text(child_el)));
                    }
                    "ul" | "ol" => {
                        let list = render_list(child_el);
                        if !list.is_empty() {
                            parts.push(format!("\n{list}\n"));
                        }
                    }
                    "p" => {
                        let text = collapsed_text(child_el);
                        if !text.is_empty() {
                            parts.push(format!("\n{text}\n"));
                        }
                    }
                    "table" => {
                        let table = render_table(child_el);
                        if !table.is_empty() {
                            parts.push(format!("\n{table}\n"));
                        }
                    }
                    "div" | "section" | "article" => {
                        let mut nested = Vec::new();
                        render_children(child_el, &mut nested);
                        let joined = nested.join(" ");
                        if !joined.trim().is_empty() {
                            parts.push(joined);
                        }
                    }
                    _ => {
                        let text = collapsed_text(child_el);
                        if !text.is_empty() {
                            parts.push(text);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// List items become indented bullet/numbered lines. Only direct `<li>`
/// children count; nested lists render through their item's text.
fn render_list(list: ElementRef<'_>) -> String {
    let ordered = list.value().name() == "ol";
    let mut items = Vec::new();
    let mut index = 0usize;

    for child in list.children() {
        let Some(li) = ElementRef::wrap(child) else {
            continue;
        };
        if li.value().name() != "li" || is_skipped(&li) {
            continue;
        }
        let text = collapsed_text(li);
        if text.is_empty() {
            continue;
        }
        index += 1;
        if ordered {
            items.push(format!("  {index}. {text}"));
        } else {
            items.push(format!("  - {text}"));
        }
    }

    items.join("\n")
}

/// Table rows become pipe-delimited lines, header and data cells alike.
fn render_table(table: ElementRef<'_>) -> String {
    let mut rows = Vec::new();

    for tr in descendants_named(table, "tr") {
        let mut cells = Vec::new();
        for cell in tr.descendants() {
            let Some(cell_el) = ElementRef::wrap(cell) else {
                continue;
            };
            let name = cell_el.value().name();
            if name == "th" || name == "td" {
                cells.push(collapsed_text(cell_el));
            }
        }
        if !cells.is_empty() {
            rows.push(cells.join(" | "));
        }
    }

    rows.join("\n")
}

/// Collect descendant elements with the given tag name, in document order.
fn descendants_named<'a>(el: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    el.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == name)
        .collect()
}

/// Visible text of a subtree with all whitespace collapsed to single spaces.
/// Skips removed/boilerplate descendants.
pub(crate) fn collapsed_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    squash_spaces(&out).trim().to_string()
}

/// Raw text of a subtree (whitespace preserved), skipping removed subtrees.
fn raw_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out.trim_matches('\n').to_string()
}

fn collect_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_skipped(&child_el) {
                        collect_text(child_el, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Collapse all whitespace runs (including newlines) to single spaces.
fn squash_spaces(text: &str) -> String {
    static WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
    WS.replace_all(text, " ").into_owned()
}

/// Final whitespace pass: collapse horizontal runs, cap blank lines at one,
/// trim each line.
pub(crate) fn normalize_whitespace(text: &str) -> String {
    static HORIZONTAL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
    static BLANK_RUNS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    let text = HORIZONTAL.replace_all(text, " ");

    // Trim lines before collapsing blank runs: a space-only line between
    // newlines would otherwise survive as an extra blank line.
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = lines.join("\n");
    BLANK_RUNS.replace_all(&text, "\n\n").trim().to_string()
}
