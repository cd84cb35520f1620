//! WPILib documentation adapter (docs.wpilib.org).

use scraper::Html;
use url::Url;

use super::{SourceAdapter, classify_language, selected_text};

/// Path segments of the software docs sections used as crawl seeds.
const SEED_SECTIONS: &[&str] = &[
    "software/commandbased",
    "software/advanced-controls",
    "software/hardware-apis",
    "software/kinematics-and-odometry",
    "software/pathplanning",
    "software/networktables",
    "software/basic-programming",
    "software/can-devices",
    "software/vision-processing",
];

/// Non-content pages excluded from the crawl (Sphinx machinery).
const EXCLUDED_FRAGMENTS: &[&str] = &[
    "_sources/",
    "genindex",
    "search.html",
    "py-modindex",
    "/_modules/",
];

/// Adapter for the official WPILib documentation (Sphinx on Read the Docs).
pub struct WpilibAdapter {
    base_url: Url,
}

impl WpilibAdapter {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse("https://docs.wpilib.org").expect("valid base URL"),
        }
    }
}

impl Default for WpilibAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for WpilibAdapter {
    fn source_id(&self) -> &'static str {
        "wpilib"
    }

    fn display_name(&self) -> &'static str {
        "WPILib"
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        &["2025", "2024", "stable"]
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        &["Java", "Python", "C++"]
    }

    fn start_urls(&self, version: &str) -> Vec<Url> {
        SEED_SECTIONS
            .iter()
            .filter_map(|section| {
                Url::parse(&format!(
                    "https://docs.wpilib.org/en/{version}/docs/{section}/index.html"
                ))
                .ok()
            })
            .collect()
    }

    fn should_crawl(&self, url: &Url) -> bool {
        if url.host_str() != Some("docs.wpilib.org") {
            return false;
        }

        let path = url.path();
        if !path.contains("/docs/software/") && !path.contains("/docs/controls/") {
            return false;
        }

        !EXCLUDED_FRAGMENTS.iter().any(|frag| path.contains(frag))
    }

    fn extract_section(&self, _doc: &Html, url: &Url) -> String {
        let path = url.path();
        let section = if path.contains("commandbased") {
            "Command-Based Programming"
        } else if path.contains("advanced-controls") || path.contains("controllers") {
            "Advanced Controls"
        } else if path.contains("hardware-apis") {
            "Hardware APIs"
        } else if path.contains("kinematics") || path.contains("odometry") {
            "Kinematics and Odometry"
        } else if path.contains("pathplanning") || path.contains("trajectory") {
            "Path Planning"
        } else if path.contains("networktables") {
            "NetworkTables"
        } else if path.contains("vision") {
            "Vision Processing"
        } else if path.contains("can-devices") {
            "CAN Devices"
        } else if path.contains("basic-programming") {
            "Basic Programming"
        } else if path.contains("wpimath") {
            "WPIMath"
        } else {
            "General"
        };
        section.to_string()
    }

    fn extract_language(&self, doc: &Html, _url: &Url) -> String {
        // Language-specific pages are rare; most content carries per-language
        // tabs. Sniff the tab labels first, then the page text.
        let tab_text = selected_text(doc, ".tab-label, .sphinx-tabs-tab");

        let mut content_text = selected_text(doc, "body");
        super::truncate_to_boundary(&mut content_text, 2000);

        let has_java = tab_text.contains("java") || content_text.contains("java");
        let has_python = tab_text.contains("python") || content_text.contains("python");
        let has_cpp = tab_text.contains("c++") || content_text.contains("cpp");

        classify_language(has_java, has_python, has_cpp)
    }

    fn extract_content(&self, doc: &Html, _url: &Url) -> String {
        // Sphinx wraps the document body in [role="main"] / .document.
        docdex_extract::render_with_selectors(
            doc,
            &["main", r#"[role="main"]"#, ".document", ".body"],
        )
        .unwrap_or_else(|| docdex_extract::content_from_doc(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test URL")
    }

    #[test]
    fn accepts_software_docs_only() {
        let adapter = WpilibAdapter::new();

        assert!(adapter.should_crawl(&url(
            "https://docs.wpilib.org/en/stable/docs/software/commandbased/commands.html"
        )));
        assert!(!adapter.should_crawl(&url(
            "https://docs.wpilib.org/en/stable/docs/hardware/sensors.html"
        )));
        assert!(!adapter.should_crawl(&url("https://other.example.com/docs/software/x")));
    }

    #[test]
    fn rejects_sphinx_machinery() {
        let adapter = WpilibAdapter::new();

        assert!(!adapter.should_crawl(&url(
            "https://docs.wpilib.org/en/stable/docs/software/_sources/index.txt"
        )));
        assert!(!adapter.should_crawl(&url(
            "https://docs.wpilib.org/en/stable/docs/software/search.html"
        )));
        assert!(!adapter.should_crawl(&url(
            "https://docs.wpilib.org/en/stable/docs/software/genindex.html"
        )));
    }

    #[test]
    fn section_from_url_path() {
        let adapter = WpilibAdapter::new();
        let doc = Html::parse_document("<html></html>");

        assert_eq!(
            adapter.extract_section(
                &doc,
                &url("https://docs.wpilib.org/en/stable/docs/software/commandbased/index.html")
            ),
            "Command-Based Programming"
        );
        assert_eq!(
            adapter.extract_section(
                &doc,
                &url("https://docs.wpilib.org/en/stable/docs/software/pathplanning/trajectory.html")
            ),
            "Path Planning"
        );
        assert_eq!(
            adapter.extract_section(
                &doc,
                &url("https://docs.wpilib.org/en/stable/docs/software/whats-new.html")
            ),
            "General"
        );
    }

    #[test]
    fn language_from_tabs() {
        let adapter = WpilibAdapter::new();
        let u = url("https://docs.wpilib.org/en/stable/docs/software/x.html");

        let multi = Html::parse_document(
            r#"<html><body>
                <div class="sphinx-tabs-tab">Java</div>
                <div class="sphinx-tabs-tab">Python</div>
                <div class="sphinx-tabs-tab">C++</div>
                <p>Shared tutorial content.</p>
            </body></html>"#,
        );
        assert_eq!(adapter.extract_language(&multi, &u), "All");

        let java_only = Html::parse_document(
            r#"<html><body>
                <div class="sphinx-tabs-tab">Java</div>
                <p>Declare the command in a subsystem.</p>
            </body></html>"#,
        );
        assert_eq!(adapter.extract_language(&java_only, &u), "Java");
    }

    #[test]
    fn start_urls_follow_version() {
        let adapter = WpilibAdapter::new();
        let seeds = adapter.start_urls("2025");
        assert_eq!(seeds.len(), SEED_SECTIONS.len());
        assert!(seeds.iter().all(|u| u.path().contains("/en/2025/docs/")));
        assert!(seeds.iter().all(|u| adapter.should_crawl(u)));
    }

    #[test]
    fn owns_wpilib_urls() {
        let adapter = WpilibAdapter::new();
        assert!(adapter.owns_url("https://docs.wpilib.org/en/stable/docs/software/index.html"));
        assert!(!adapter.owns_url("https://docs.revrobotics.com/brushless"));
    }
}
