//! The query-serving service: loaded artifacts, per-source search indexes,
//! and cache-backed page fetching.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use docdex_cache::PageFetcher;
use docdex_crawler::{SourceAdapter, SourceRegistry};
use docdex_search::{ScoredResult, SearchIndex, merge_results};
use docdex_shared::{
    AppConfig, CacheSettings, IndexArtifact, PageContent, Result, SearchHit, SectionSummary,
};

/// One page record joined with its source/version provenance.
#[derive(Debug, Clone)]
pub struct IndexedPage {
    pub record: docdex_shared::PageRecord,
    pub source_id: String,
    pub vendor: String,
    pub version: String,
}

/// A source's loaded pages and its built search index.
struct SourceIndex {
    adapter: Arc<dyn SourceAdapter>,
    pages: Vec<IndexedPage>,
    index: SearchIndex<IndexedPage>,
}

/// Serves search/fetch/sections queries over every loaded source.
///
/// Index build and query are synchronous CPU-bound operations; hosts
/// serving many simultaneous queries should run them on a blocking worker
/// (e.g. `tokio::task::spawn_blocking`).
pub struct DocService {
    sources: Vec<SourceIndex>,
    fetcher: PageFetcher,
}

impl DocService {
    /// Load artifacts for every enabled configured source and build the
    /// in-memory indexes.
    ///
    /// A missing or corrupt artifact is a soft failure: that source simply
    /// contributes zero records.
    #[instrument(skip_all)]
    pub fn load(registry: &SourceRegistry, config: &AppConfig) -> Result<Self> {
        let data_dir = docdex_shared::data_dir(config)?;
        let fetcher = PageFetcher::new(&CacheSettings::from(config))?;

        // An empty [[sources]] list means "everything registered, default
        // versions" so a fresh install works without editing config.
        let entries: Vec<docdex_shared::SourceEntry> = if config.sources.is_empty() {
            registry
                .all()
                .iter()
                .map(|a| docdex_shared::SourceEntry {
                    id: a.source_id().to_string(),
                    enabled: true,
                    versions: a
                        .supported_versions()
                        .iter()
                        .map(|v| v.to_string())
                        .collect(),
                })
                .collect()
        } else {
            config.sources.clone()
        };

        let mut sources = Vec::new();

        for entry in &entries {
            if !entry.enabled {
                continue;
            }
            let Some(adapter) = registry.get(&entry.id) else {
                warn!(source = %entry.id, "no adapter registered for configured source");
                continue;
            };

            let mut pages: Vec<IndexedPage> = Vec::new();
            for version in &entry.versions {
                let path = data_dir
                    .join(&entry.id)
                    .join(format!("index_{version}.json"));

                if !path.exists() {
                    debug!(path = %path.display(), "artifact missing, contributes no records");
                    continue;
                }

                match IndexArtifact::load(&path) {
                    Ok(artifact) => {
                        info!(
                            source = %entry.id,
                            version = %version,
                            pages = artifact.pages.len(),
                            "loaded index artifact"
                        );
                        pages.extend(artifact.pages.into_iter().map(|record| IndexedPage {
                            record,
                            source_id: entry.id.clone(),
                            vendor: adapter.display_name().to_string(),
                            version: version.clone(),
                        }));
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "unreadable artifact, loading as empty");
                    }
                }
            }

            let mut index = SearchIndex::new();
            index.build(pages.clone(), |p| {
                format!("{} {} {}", p.record.title, p.record.section, p.record.content)
            });

            sources.push(SourceIndex {
                adapter,
                pages,
                index,
            });
        }

        Ok(Self { sources, fetcher })
    }

    /// Search all (or the named) sources and merge into one ranked list.
    ///
    /// Unknown source ids, unbuilt indexes, and queries that tokenize to
    /// nothing all contribute empty lists rather than errors.
    pub fn search(
        &self,
        query: &str,
        sources: Option<&[String]>,
        version: Option<&str>,
        language: Option<&str>,
        max_results: usize,
    ) -> Vec<SearchHit> {
        let lists: Vec<Vec<ScoredResult<IndexedPage>>> = self
            .sources
            .iter()
            .filter(|s| match sources {
                Some(ids) => ids.iter().any(|id| id == s.adapter.source_id()),
                None => true,
            })
            .map(|s| {
                s.index.search_with_filter(
                    query,
                    |p| {
                        version.is_none_or(|v| p.version == v)
                            && p.record.matches_language(language)
                    },
                    max_results,
                )
            })
            .collect();

        merge_results(lists, max_results)
            .into_iter()
            .map(|r| SearchHit {
                url: r.item.record.url,
                title: r.item.record.title,
                section: r.item.record.section,
                vendor: r.item.vendor,
                language: r.item.record.language,
                version: r.item.version,
                content_preview: r.item.record.content_preview,
                score: r.score,
            })
            .collect()
    }

    /// Fetch a documentation page on demand through the response cache.
    ///
    /// Returns `None` when no loaded source owns the URL or the page is
    /// unreachable — the query boundary reports "not found", not an error.
    pub async fn fetch_page(&self, url: &str) -> Result<Option<PageContent>> {
        let Some(source) = self.sources.iter().find(|s| s.adapter.owns_url(url)) else {
            debug!(url, "no loaded source owns this URL");
            return Ok(None);
        };

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "page fetch failed");
                return Ok(None);
            }
        };

        let content = docdex_extract::extract_content(&html, url);
        let title = docdex_extract::extract_title(&html)
            .unwrap_or_else(|| source.adapter.display_name().to_string());

        // Join index metadata when the URL is known to the corpus.
        let known = source
            .pages
            .iter()
            .find(|p| p.record.url.eq_ignore_ascii_case(url));

        Ok(Some(PageContent {
            url: url.to_string(),
            title,
            content,
            vendor: source.adapter.display_name().to_string(),
            language: known.map(|p| p.record.language.clone()),
            version: known.map(|p| p.version.clone()),
            section: known.map(|p| p.record.section.clone()),
            fetched_at: Utc::now().to_rfc3339(),
        }))
    }

    /// Section names with page counts per source, under the same
    /// version/language filter as `search`.
    pub fn list_sections(
        &self,
        version: Option<&str>,
        language: Option<&str>,
    ) -> Vec<SectionSummary> {
        let mut out = Vec::new();

        for source in &self.sources {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for page in &source.pages {
                if version.is_none_or(|v| page.version == v)
                    && page.record.matches_language(language)
                {
                    *counts.entry(page.record.section.as_str()).or_insert(0) += 1;
                }
            }
            for (name, page_count) in counts {
                out.push(SectionSummary {
                    name: name.to_string(),
                    vendor: source.adapter.display_name().to_string(),
                    page_count,
                });
            }
        }

        out
    }

    /// Identifiers and page counts of the loaded sources.
    pub fn loaded_sources(&self) -> Vec<(String, usize)> {
        self.sources
            .iter()
            .map(|s| (s.adapter.source_id().to_string(), s.pages.len()))
            .collect()
    }

    /// Drop a cached page so the next fetch goes to the network.
    pub async fn invalidate_page(&self, url: &str) -> bool {
        self.fetcher.invalidate(url).await
    }
}
