//! BM25 relevance index, generic over the indexed item type.

use std::collections::HashMap;

use tracing::debug;

use crate::tokenizer::Tokenizer;

// Okapi BM25 parameters.
const K1: f64 = 1.2;
const B: f64 = 0.75;

/// A search result with its relevance score.
///
/// Natural ordering is *descending* by score: higher relevance sorts first,
/// and a stable sort preserves input order on ties.
#[derive(Debug, Clone)]
pub struct ScoredResult<T> {
    pub item: T,
    pub score: f64,
}

impl<T> PartialEq for ScoredResult<T> {
    fn eq(&self, other: &Self) -> bool {
        self.score.total_cmp(&other.score) == std::cmp::Ordering::Equal
    }
}

impl<T> Eq for ScoredResult<T> {}

impl<T> PartialOrd for ScoredResult<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScoredResult<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: higher score sorts first.
        other.score.total_cmp(&self.score)
    }
}

/// Term-statistics index over a set of items.
///
/// `build` replaces the corpus wholesale; there is no incremental update.
/// Searching an unbuilt index, or with a query that tokenizes to nothing,
/// returns an empty result set rather than an error.
#[derive(Debug)]
pub struct SearchIndex<T> {
    tokenizer: Tokenizer,
    items: Vec<T>,
    corpus: Vec<Vec<String>>,
    doc_freqs: HashMap<String, usize>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
}

impl<T> Default for SearchIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SearchIndex<T> {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            items: Vec::new(),
            corpus: Vec::new(),
            doc_freqs: HashMap::new(),
            doc_lens: Vec::new(),
            avg_doc_len: 0.0,
        }
    }

    /// Tokenize every item and rebuild the corpus statistics.
    ///
    /// An empty item set leaves the index in the not-built state.
    pub fn build(&mut self, items: Vec<T>, text_extractor: impl Fn(&T) -> String) {
        let corpus: Vec<Vec<String>> = items
            .iter()
            .map(|item| self.tokenizer.tokenize(&text_extractor(item)))
            .collect();
        self.corpus = corpus;
        self.items = items;

        self.doc_freqs.clear();
        for tokens in &self.corpus {
            let mut seen: Vec<&String> = tokens.iter().collect();
            seen.sort_unstable();
            seen.dedup();
            for token in seen {
                *self.doc_freqs.entry(token.clone()).or_insert(0) += 1;
            }
        }

        self.doc_lens = self.corpus.iter().map(Vec::len).collect();
        let total: usize = self.doc_lens.iter().sum();
        self.avg_doc_len = if self.corpus.is_empty() {
            0.0
        } else {
            total as f64 / self.corpus.len() as f64
        };

        debug!(
            items = self.items.len(),
            terms = self.doc_freqs.len(),
            "search index built"
        );
    }

    /// Number of indexed items.
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Whether `build` has been called with a non-empty item set.
    pub fn is_built(&self) -> bool {
        !self.corpus.is_empty()
    }

    /// Search for the top `max_results` items matching `query`.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<ScoredResult<T>>
    where
        T: Clone,
    {
        self.search_with_filter(query, |_| true, max_results)
    }

    /// Search with an additional predicate over the original item, letting
    /// callers narrow by metadata without rebuilding the index.
    pub fn search_with_filter(
        &self,
        query: &str,
        filter: impl Fn(&T) -> bool,
        max_results: usize,
    ) -> Vec<ScoredResult<T>>
    where
        T: Clone,
    {
        if !self.is_built() {
            return Vec::new();
        }

        let query_tokens = self.tokenizer.tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<ScoredResult<T>> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let score = self.score_doc(i, &query_tokens);
                if score > 0.0 && filter(item) {
                    Some(ScoredResult {
                        item: item.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        results.sort();
        results.truncate(max_results);
        results
    }

    /// Okapi BM25 score of one document against the query tokens.
    fn score_doc(&self, doc: usize, query_tokens: &[String]) -> f64 {
        let doc_len = self.doc_lens[doc] as f64;
        let n = self.corpus.len() as f64;
        let norm = K1 * (1.0 - B + B * doc_len / self.avg_doc_len);

        query_tokens
            .iter()
            .map(|token| {
                let tf = self.corpus[doc].iter().filter(|t| *t == token).count() as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                let df = self.doc_freqs.get(token).copied().unwrap_or(0) as f64;
                // Non-negative idf variant: terms in every document score ~0
                // instead of negative.
                let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                idf * tf * (K1 + 1.0) / (tf + norm)
            })
            .sum()
    }
}
