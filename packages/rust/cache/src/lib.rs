//! Cached HTTP fetching for on-demand page refetches.
//!
//! [`ResponseStore`] is the pure TTL/eviction state machine;
//! [`PageFetcher`] wraps it with a `reqwest` client and a mutex so the
//! concurrent query-serving path shares one cache.

mod store;

pub use store::{CacheEntry, ResponseStore};

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use docdex_shared::{CacheSettings, DocdexError, Result};

/// User-Agent string for page fetch requests.
const USER_AGENT: &str = concat!("docdex/", env!("CARGO_PKG_VERSION"));

/// HTTP client with response caching for documentation page fetching.
pub struct PageFetcher {
    client: reqwest::Client,
    store: Mutex<ResponseStore>,
}

impl PageFetcher {
    /// Create a fetcher with the given cache settings.
    pub fn new(settings: &CacheSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| DocdexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            store: Mutex::new(ResponseStore::new(settings.ttl, settings.capacity)),
        })
    }

    /// Fetch a URL, serving a live cached response without a network call.
    ///
    /// The lock covers the cache lookup and the write-back but not the
    /// network fetch itself, so it never serializes unrelated requests.
    /// Concurrent misses on the same URL may therefore each fetch once;
    /// the last write wins and both callers see identical content.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        {
            let store = self.store.lock().await;
            if let Some(entry) = store.get(url) {
                debug!(url, "cache hit");
                return Ok(entry.body.clone());
            }
        }

        debug!(url, "cache miss, fetching");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DocdexError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocdexError::Network(format!("{url}: HTTP {status}")));
        }

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .text()
            .await
            .map_err(|e| DocdexError::Network(format!("{url}: body read failed: {e}")))?;

        {
            let mut store = self.store.lock().await;
            store.put(url, body.clone(), headers);
        }

        Ok(body)
    }

    /// Remove a specific URL from the cache. Returns whether it was present.
    pub async fn invalidate(&self, url: &str) -> bool {
        self.store.lock().await.invalidate(url)
    }

    /// Drop every cached response.
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }

    /// Number of currently cached responses (live or expired).
    pub async fn cached_count(&self) -> usize {
        self.store.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(ttl: Duration) -> CacheSettings {
        CacheSettings {
            ttl,
            capacity: 16,
            timeout: Duration::from_secs(5),
        }
    }

    async fn mock_server(expected_hits: u64) -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/page"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html>motor docs</html>"),
            )
            .expect(expected_hits)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_is_served_from_cache() {
        let server = mock_server(1).await;
        let fetcher = PageFetcher::new(&settings(Duration::from_secs(60))).unwrap();
        let url = format!("{}/page", server.uri());

        let first = fetcher.fetch(&url).await.unwrap();
        let second = fetcher.fetch(&url).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.cached_count().await, 1);
        // MockServer::expect(1) verifies on drop that only one request hit
        // the network.
    }

    #[tokio::test]
    async fn expired_entry_triggers_a_fresh_fetch() {
        let server = mock_server(2).await;
        let fetcher = PageFetcher::new(&settings(Duration::from_millis(5))).unwrap();
        let url = format!("{}/page", server.uri());

        fetcher.fetch(&url).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.fetch(&url).await.unwrap();
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let server = mock_server(2).await;
        let fetcher = PageFetcher::new(&settings(Duration::from_secs(60))).unwrap();
        let url = format!("{}/page", server.uri());

        fetcher.fetch(&url).await.unwrap();
        assert!(fetcher.invalidate(&url).await);
        fetcher.fetch(&url).await.unwrap();
    }

    #[tokio::test]
    async fn network_failure_leaves_cache_unmodified() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/missing"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(&settings(Duration::from_secs(60))).unwrap();
        let url = format!("{}/missing", server.uri());

        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(DocdexError::Network(_))));
        assert_eq!(fetcher.cached_count().await, 0);
    }
}
