//! Merging independently-scored result streams into one ranked list.

use crate::index::ScoredResult;

/// Flatten per-source ranked lists into a single capped, globally sorted
/// list.
///
/// Scores are assumed comparable across lists — every source is scored by
/// the same BM25 implementation — so no normalization is applied. The sort
/// is stable: equal scores preserve relative input order. A single source
/// can dominate the merged set if its scores are numerically higher.
pub fn merge_results<T>(
    result_lists: Vec<Vec<ScoredResult<T>>>,
    max_results: usize,
) -> Vec<ScoredResult<T>> {
    let mut all: Vec<ScoredResult<T>> = result_lists.into_iter().flatten().collect();
    all.sort();
    all.truncate(max_results);
    all
}
