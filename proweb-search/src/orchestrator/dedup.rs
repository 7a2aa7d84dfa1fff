//! Result deduplication by exact URL and near-duplicate title.
//!
//! A single pass in input order: the first occurrence of a page is kept
//! and every later result judged to be the same page is dropped. No
//! fields are merged between duplicates.

use std::collections::HashSet;

use crate::config::DedupThresholds;
use crate::types::SearchResult;

/// Remove exact-URL repeats and near-duplicate titles.
///
/// A result is dropped when its URL equals an already-kept URL, or when
/// its title is a near-duplicate (see [`is_near_duplicate`]) of an
/// already-kept title. The relative order of kept results is unchanged,
/// so running this twice gives the same output as running it once.
pub fn deduplicate(results: Vec<SearchResult>, thresholds: &DedupThresholds) -> Vec<SearchResult> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut kept_titles: Vec<Vec<char>> = Vec::new();
    let mut kept = Vec::with_capacity(results.len());

    for result in results {
        if seen_urls.contains(&result.url) {
            continue;
        }
        let folded = fold_title(&result.title);
        if kept_titles
            .iter()
            .any(|existing| near_duplicate_folded(existing, &folded, thresholds))
        {
            continue;
        }
        seen_urls.insert(result.url.clone());
        kept_titles.push(folded);
        kept.push(result);
    }

    kept
}

/// Whether two titles are heuristically the same page.
///
/// Case-folded, their character lengths must differ by less than
/// `length_tolerance` and their first `min(prefix_chars, shorter length)`
/// characters must be identical.
pub fn is_near_duplicate(a: &str, b: &str, thresholds: &DedupThresholds) -> bool {
    near_duplicate_folded(&fold_title(a), &fold_title(b), thresholds)
}

fn fold_title(title: &str) -> Vec<char> {
    title.to_lowercase().chars().collect()
}

fn near_duplicate_folded(a: &[char], b: &[char], thresholds: &DedupThresholds) -> bool {
    if a.len().abs_diff(b.len()) >= thresholds.length_tolerance {
        return false;
    }
    let window = thresholds.prefix_chars.min(a.len()).min(b.len());
    a[..window] == b[..window]
}
