//! REV Robotics documentation adapter (docs.revrobotics.com).

use scraper::Html;
use url::Url;

use super::{SourceAdapter, classify_language, selected_text};

/// FRC-relevant documentation subtrees. Everything else on the site
/// (consumer kits, legacy products) is out of scope.
const ALLOWED_SECTIONS: &[&str] = &[
    "/brushless/",
    "/through-bore-encoder/",
    "/rev-hardware-client/",
    "/ion/",
];

/// Non-content pages excluded from the crawl.
const EXCLUDED_FRAGMENTS: &[&str] = &["/api/", "/changelog", "/release-notes"];

/// Adapter for REV Robotics product documentation (GitBook).
pub struct RevAdapter {
    base_url: Url,
}

impl RevAdapter {
    pub fn new() -> Self {
        Self {
            base_url: Url::parse("https://docs.revrobotics.com").expect("valid base URL"),
        }
    }
}

impl Default for RevAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for RevAdapter {
    fn source_id(&self) -> &'static str {
        "rev"
    }

    fn display_name(&self) -> &'static str {
        "REV Robotics"
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        &["2025"]
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        &["Java", "C++"]
    }

    fn start_urls(&self, _version: &str) -> Vec<Url> {
        // REV docs are unversioned; the version label only tags the artifact.
        [
            "https://docs.revrobotics.com/brushless/spark-max/overview",
            "https://docs.revrobotics.com/brushless/spark-flex/overview",
            "https://docs.revrobotics.com/brushless/neo/neo-motor",
            "https://docs.revrobotics.com/brushless/neo/neo-vortex",
            "https://docs.revrobotics.com/through-bore-encoder/overview",
            "https://docs.revrobotics.com/rev-hardware-client/getting-started",
        ]
        .iter()
        .filter_map(|u| Url::parse(u).ok())
        .collect()
    }

    fn should_crawl(&self, url: &Url) -> bool {
        if url.host_str() != Some("docs.revrobotics.com") {
            return false;
        }
        if url.query().is_some() {
            return false;
        }

        let path = url.path();
        if !ALLOWED_SECTIONS.iter().any(|s| path.contains(s)) {
            return false;
        }

        !EXCLUDED_FRAGMENTS.iter().any(|frag| path.contains(frag))
    }

    fn extract_section(&self, _doc: &Html, url: &Url) -> String {
        let path = url.path().to_lowercase();
        let section = if path.contains("/spark-max/") {
            "SPARK MAX"
        } else if path.contains("/spark-flex/") {
            "SPARK Flex"
        } else if path.contains("/neo-motor") || path.contains("/neo-550") {
            "NEO Motors"
        } else if path.contains("/neo-vortex") {
            "NEO Vortex"
        } else if path.contains("/through-bore-encoder/") {
            "Through Bore Encoder"
        } else if path.contains("/rev-hardware-client/") {
            "REV Hardware Client"
        } else if path.contains("/ion/") {
            "REV ION"
        } else if path.contains("/revlib") {
            "REVLib"
        } else {
            "General"
        };
        section.to_string()
    }

    fn extract_language(&self, doc: &Html, _url: &Url) -> String {
        // Hardware pages are language-agnostic; code samples reveal the
        // language when one is present.
        let code_text = selected_text(doc, "code");

        let has_java = code_text.contains("import com.rev") || code_text.contains("cansparkmax");
        let has_cpp = code_text.contains("#include") || code_text.contains("rev::");

        classify_language(has_java, false, has_cpp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docdex_shared::LANGUAGE_ALL;

    fn url(s: &str) -> Url {
        Url::parse(s).expect("valid test URL")
    }

    #[test]
    fn accepts_frc_sections_only() {
        let adapter = RevAdapter::new();

        assert!(adapter.should_crawl(&url(
            "https://docs.revrobotics.com/brushless/spark-max/overview"
        )));
        assert!(adapter.should_crawl(&url(
            "https://docs.revrobotics.com/through-bore-encoder/overview"
        )));
        assert!(!adapter.should_crawl(&url("https://docs.revrobotics.com/duo-control/intro")));
        assert!(!adapter.should_crawl(&url("https://example.com/brushless/spark-max/x")));
    }

    #[test]
    fn rejects_query_strings_and_changelogs() {
        let adapter = RevAdapter::new();

        assert!(!adapter.should_crawl(&url(
            "https://docs.revrobotics.com/brushless/spark-max/overview?fallback=true"
        )));
        assert!(!adapter.should_crawl(&url(
            "https://docs.revrobotics.com/brushless/spark-max/changelog"
        )));
        assert!(!adapter.should_crawl(&url(
            "https://docs.revrobotics.com/brushless/api/java"
        )));
    }

    #[test]
    fn section_from_product_path() {
        let adapter = RevAdapter::new();
        let doc = Html::parse_document("<html></html>");

        assert_eq!(
            adapter.extract_section(
                &doc,
                &url("https://docs.revrobotics.com/brushless/spark-max/overview")
            ),
            "SPARK MAX"
        );
        assert_eq!(
            adapter.extract_section(
                &doc,
                &url("https://docs.revrobotics.com/brushless/neo/neo-vortex")
            ),
            "NEO Vortex"
        );
    }

    #[test]
    fn language_from_code_samples() {
        let adapter = RevAdapter::new();
        let u = url("https://docs.revrobotics.com/brushless/spark-max/code");

        let java = Html::parse_document(
            "<html><body><code>import com.revrobotics.CANSparkMax;</code></body></html>",
        );
        assert_eq!(adapter.extract_language(&java, &u), "Java");

        let cpp = Html::parse_document(
            "<html><body><code>rev::spark::SparkMax motor;</code></body></html>",
        );
        assert_eq!(adapter.extract_language(&cpp, &u), "C++");

        let none = Html::parse_document("<html><body><p>Mount the encoder.</p></body></html>");
        assert_eq!(adapter.extract_language(&none, &u), LANGUAGE_ALL);
    }
}
