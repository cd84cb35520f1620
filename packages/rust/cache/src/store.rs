//! In-memory response store with TTL expiry and oldest-first eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

/// A cached HTTP response body with its fetch time and headers.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub body: String,
    pub timestamp: Instant,
    pub headers: HashMap<String, String>,
}

/// Bounded key/value store mapping URL hashes to timestamped payloads.
///
/// Pure state machine: no I/O, no locking. [`crate::PageFetcher`] wraps it
/// in a mutex for the concurrent query-serving path.
#[derive(Debug)]
pub struct ResponseStore {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<String, CacheEntry>,
}

impl ResponseStore {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
        }
    }

    /// Stable cache key: first 16 hex chars of the URL's SHA-256.
    /// Collision risk at this width is accepted as negligible.
    pub fn cache_key(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }

    /// Return the cached body for `url` if a live entry exists.
    /// An entry at or past its TTL is not served.
    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        let entry = self.entries.get(&Self::cache_key(url))?;
        if entry.timestamp.elapsed() < self.ttl {
            Some(entry)
        } else {
            None
        }
    }

    /// Store a response, evicting the oldest entry first when at capacity.
    pub fn put(&mut self, url: &str, body: String, headers: HashMap<String, String>) {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            Self::cache_key(url),
            CacheEntry {
                body,
                timestamp: Instant::now(),
                headers,
            },
        );
    }

    /// Remove the entry with the smallest timestamp.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.timestamp)
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Remove a specific URL's entry. Returns whether one was present.
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.remove(&Self::cache_key(url)).is_some()
    }

    /// Empty the store unconditionally.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
