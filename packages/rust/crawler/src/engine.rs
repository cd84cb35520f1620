//! Bounded, polite documentation crawler.
//!
//! Walks a source's seed URLs depth-first with an explicit stack, respecting
//! depth/page/deadline bounds and the adapter's URL acceptance gate, and
//! produces a serializable [`IndexArtifact`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use docdex_shared::{
    CrawlLimits, DocdexError, IndexArtifact, MIN_CONTENT_LEN, PREVIEW_MAX_LEN, PageRecord, Result,
};

use crate::adapters::SourceAdapter;

/// User-Agent string for crawl requests.
const USER_AGENT: &str = concat!("docdex/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// CrawlSummary
// ---------------------------------------------------------------------------

/// Summary of a completed crawl operation.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Number of records retained in the artifact.
    pub pages_indexed: usize,
    /// Number of URLs fetched (including pages that were discarded).
    pub urls_fetched: usize,
    /// Errors encountered (URL, error message). None of these abort a crawl.
    pub errors: Vec<(String, String)>,
    /// Total duration of the crawl.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// IndexBuilder
// ---------------------------------------------------------------------------

/// Crawls one documentation source into an index artifact.
///
/// Traversal is single-threaded cooperative: one fetch in flight at a time,
/// with the politeness delay as the scheduling yield point. Independent
/// sources crawl as independent builder instances with disjoint state.
pub struct IndexBuilder {
    adapter: Arc<dyn SourceAdapter>,
    limits: CrawlLimits,
    client: Client,
}

impl IndexBuilder {
    /// Create a builder for the given source.
    pub fn new(adapter: Arc<dyn SourceAdapter>, limits: CrawlLimits) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(limits.timeout)
            .build()
            .map_err(|e| DocdexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            adapter,
            limits,
            client,
        })
    }

    /// Crawl the source and build an artifact for `version`.
    #[instrument(skip_all, fields(source = self.adapter.source_id(), version))]
    pub async fn build(&self, version: &str) -> Result<(IndexArtifact, CrawlSummary)> {
        let started = Instant::now();
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages: Vec<PageRecord> = Vec::new();
        let mut errors: Vec<(String, String)> = Vec::new();
        let mut urls_fetched = 0usize;

        info!(
            max_pages = self.limits.max_pages,
            max_depth = self.limits.max_depth,
            rate_limit_ms = self.limits.rate_limit.as_millis() as u64,
            "starting crawl"
        );

        'seeds: for seed in self.adapter.start_urls(version) {
            if pages.len() >= self.limits.max_pages {
                break;
            }

            // Explicit stack instead of recursion: depth and page caps stay
            // trivially enforceable on arbitrarily deep site graphs.
            let mut stack: Vec<(Url, u32)> = vec![(seed, 0)];

            while let Some((url, depth)) = stack.pop() {
                if pages.len() >= self.limits.max_pages {
                    info!(max_pages = self.limits.max_pages, "page cap reached");
                    break 'seeds;
                }
                if let Some(deadline) = self.limits.deadline {
                    if started.elapsed() >= deadline {
                        warn!(elapsed_ms = started.elapsed().as_millis() as u64, "crawl deadline reached");
                        break 'seeds;
                    }
                }
                if depth > self.limits.max_depth {
                    continue;
                }

                let key = visited_key(&url);
                if visited.contains(&key) {
                    continue;
                }
                if !self.adapter.should_crawl(&url) {
                    debug!(%url, "rejected by adapter, skipping");
                    continue;
                }
                // Mark before fetching so the same URL reached via another
                // link path in this pass is not processed twice.
                visited.insert(key);

                if urls_fetched > 0 && !self.limits.rate_limit.is_zero() {
                    tokio::time::sleep(self.limits.rate_limit).await;
                }
                urls_fetched += 1;

                match self.visit(&url).await {
                    Ok((record, links)) => {
                        if let Some(record) = record {
                            info!(title = %record.title, %url, "indexed page");
                            pages.push(record);
                        }
                        // Reverse so the stack visits links in document order.
                        for link in links.into_iter().rev() {
                            stack.push((link, depth + 1));
                        }
                    }
                    Err(e) => {
                        // A single failing page never aborts the crawl.
                        warn!(%url, error = %e, "page failed, skipping");
                        errors.push((url.to_string(), e.to_string()));
                    }
                }
            }
        }

        let summary = CrawlSummary {
            pages_indexed: pages.len(),
            urls_fetched,
            errors,
            duration: started.elapsed(),
        };

        info!(
            pages_indexed = summary.pages_indexed,
            urls_fetched = summary.urls_fetched,
            errors = summary.errors.len(),
            duration_ms = summary.duration.as_millis() as u64,
            "crawl completed"
        );

        let artifact = IndexArtifact {
            vendor: self.adapter.source_id().to_string(),
            version: version.to_string(),
            built_at: Utc::now(),
            pages,
        };

        Ok((artifact, summary))
    }

    /// Fetch one URL, returning its record (if it passes the content gates)
    /// and its outgoing links.
    async fn visit(&self, url: &Url) -> Result<(Option<PageRecord>, Vec<Url>)> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DocdexError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocdexError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DocdexError::Network(format!("{url}: body read failed: {e}")))?;

        let doc = Html::parse_document(&body);
        let links = self.adapter.extract_links(&doc, url);
        let record = self.page_record(&doc, url);

        Ok((record, links))
    }

    /// Assemble a record, discarding pages without a title or with
    /// near-empty content.
    fn page_record(&self, doc: &Html, url: &Url) -> Option<PageRecord> {
        let title = self
            .adapter
            .extract_title(doc, url)
            .filter(|t| !t.is_empty())?;

        let content = self.adapter.extract_content(doc, url);
        if content.len() <= MIN_CONTENT_LEN {
            debug!(%url, len = content.len(), "content below minimum, discarding");
            return None;
        }

        let section = self.adapter.extract_section(doc, url);
        let language = self.adapter.extract_language(doc, url);
        let content_preview = docdex_extract::extract_preview(&content, PREVIEW_MAX_LEN);

        Some(PageRecord {
            url: url.to_string(),
            title,
            section,
            language,
            content,
            content_preview,
        })
    }
}

/// Visited-set key: the URL with any fragment stripped.
fn visited_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{SourceAdapter, classify_language};

    // -----------------------------------------------------------------------
    // Test adapter against a wiremock server
    // -----------------------------------------------------------------------

    struct TestAdapter {
        base_url: Url,
    }

    impl TestAdapter {
        fn new(server_uri: &str) -> Self {
            Self {
                base_url: Url::parse(server_uri).expect("valid server URI"),
            }
        }
    }

    impl SourceAdapter for TestAdapter {
        fn source_id(&self) -> &'static str {
            "test"
        }

        fn display_name(&self) -> &'static str {
            "Test Docs"
        }

        fn base_url(&self) -> &Url {
            &self.base_url
        }

        fn supported_versions(&self) -> &'static [&'static str] {
            &["1"]
        }

        fn supported_languages(&self) -> &'static [&'static str] {
            &["Java", "Python"]
        }

        fn start_urls(&self, _version: &str) -> Vec<Url> {
            vec![self.base_url.clone()]
        }

        fn should_crawl(&self, url: &Url) -> bool {
            url.authority() == self.base_url.authority() && !url.path().starts_with("/admin")
        }

        fn extract_section(&self, _doc: &Html, _url: &Url) -> String {
            "General".to_string()
        }

        fn extract_language(&self, doc: &Html, _url: &Url) -> String {
            let text = crate::adapters::selected_text(doc, "body");
            classify_language(text.contains("java"), text.contains("python"), false)
        }
    }

    fn limits(max_pages: usize, max_depth: u32) -> CrawlLimits {
        CrawlLimits {
            max_pages,
            max_depth,
            rate_limit: Duration::ZERO,
            timeout: Duration::from_secs(5),
            deadline: None,
        }
    }

    fn page_body(title: &str, extra: &str) -> String {
        format!(
            r#"<html><head><title>{title}</title></head><body><main>
                <h1>{title}</h1>
                <p>This page documents {title} in enough detail that the
                   minimum content length gate accepts it for indexing.</p>
                {extra}
            </main></body></html>"#
        )
    }

    async fn mount(server: &wiremock::MockServer, path: &str, body: String, expected: u64) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(body))
            .expect(expected)
            .mount(server)
            .await;
    }

    async fn build(server: &wiremock::MockServer, limits: CrawlLimits) -> (IndexArtifact, CrawlSummary) {
        let adapter = Arc::new(TestAdapter::new(&server.uri()));
        let builder = IndexBuilder::new(adapter, limits).expect("builder");
        builder.build("1").await.expect("crawl")
    }

    #[tokio::test]
    async fn crawls_linked_pages_once_each() {
        let server = wiremock::MockServer::start().await;

        // Root links to a and b; a and b link back to root (cycle).
        mount(
            &server,
            "/",
            page_body("Root", r#"<a href="/a">A</a><a href="/b">B</a>"#),
            1,
        )
        .await;
        mount(&server, "/a", page_body("Page A", r#"<a href="/">Root</a>"#), 1).await;
        mount(&server, "/b", page_body("Page B", r#"<a href="/">Root</a>"#), 1).await;

        let (artifact, summary) = build(&server, limits(100, 3)).await;

        assert_eq!(summary.pages_indexed, 3);
        assert_eq!(summary.urls_fetched, 3);
        assert!(summary.errors.is_empty());
        assert_eq!(artifact.vendor, "test");
        assert_eq!(artifact.pages.len(), 3);
        // expect(1) on each mock verifies no URL was fetched twice.
    }

    #[tokio::test]
    async fn respects_depth_bound() {
        let server = wiremock::MockServer::start().await;

        mount(&server, "/", page_body("Root", r#"<a href="/l1">L1</a>"#), 1).await;
        mount(&server, "/l1", page_body("Level One", r#"<a href="/l2">L2</a>"#), 1).await;
        mount(&server, "/l2", page_body("Level Two", ""), 0).await;

        let (artifact, _) = build(&server, limits(100, 1)).await;

        // Root (depth 0) and l1 (depth 1); l2 is past the ceiling.
        assert_eq!(artifact.pages.len(), 2);
    }

    #[tokio::test]
    async fn respects_page_cap() {
        let server = wiremock::MockServer::start().await;

        mount(
            &server,
            "/",
            page_body("Root", r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#),
            1,
        )
        .await;
        // The cap stops traversal after the second fetch, so only the first
        // link in document order is reached.
        mount(&server, "/a", page_body("Page A", ""), 1).await;
        mount(&server, "/b", page_body("Page B", ""), 0).await;
        mount(&server, "/c", page_body("Page C", ""), 0).await;

        let (artifact, _) = build(&server, limits(2, 3)).await;
        assert_eq!(artifact.pages.len(), 2);
    }

    #[tokio::test]
    async fn rejected_urls_are_never_fetched() {
        let server = wiremock::MockServer::start().await;

        mount(
            &server,
            "/",
            page_body("Root", r#"<a href="/admin/panel">Admin</a><a href="/a">A</a>"#),
            1,
        )
        .await;
        mount(&server, "/a", page_body("Page A", ""), 1).await;
        mount(&server, "/admin/panel", page_body("Admin", ""), 0).await;

        let (artifact, _) = build(&server, limits(100, 3)).await;
        assert_eq!(artifact.pages.len(), 2);
    }

    #[tokio::test]
    async fn failing_page_does_not_abort_crawl() {
        let server = wiremock::MockServer::start().await;

        mount(
            &server,
            "/",
            page_body("Root", r#"<a href="/broken">X</a><a href="/a">A</a>"#),
            1,
        )
        .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/broken"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount(&server, "/a", page_body("Page A", ""), 1).await;

        let (artifact, summary) = build(&server, limits(100, 3)).await;

        assert_eq!(artifact.pages.len(), 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].0.contains("/broken"));
    }

    #[tokio::test]
    async fn thin_pages_are_discarded_but_still_traversed() {
        let server = wiremock::MockServer::start().await;

        // Hub page with a title but almost no content still contributes links.
        let hub = r#"<html><head><title>Hub</title></head><body><main>
            <a href="/a">A</a>
        </main></body></html>"#;
        mount(&server, "/", hub.to_string(), 1).await;
        mount(&server, "/a", page_body("Page A", ""), 1).await;

        let (artifact, summary) = build(&server, limits(100, 3)).await;

        assert_eq!(summary.urls_fetched, 2);
        assert_eq!(artifact.pages.len(), 1);
        assert_eq!(artifact.pages[0].title, "Page A");
    }

    #[tokio::test]
    async fn records_carry_section_language_and_preview() {
        let server = wiremock::MockServer::start().await;

        mount(
            &server,
            "/",
            page_body("Java Guide", "<p>Written for java developers.</p>"),
            1,
        )
        .await;

        let (artifact, _) = build(&server, limits(100, 0)).await;

        let record = &artifact.pages[0];
        assert_eq!(record.section, "General");
        assert_eq!(record.language, "Java");
        assert!(!record.content_preview.is_empty());
        assert!(record.content_preview.len() <= PREVIEW_MAX_LEN + 3);
        assert!(record.content.len() > MIN_CONTENT_LEN);
    }
}
