//! Score adjustment and ranking for deduplicated results.
//!
//! Each result starts from the score its adapter assigned and gains:
//! - a content bonus of 5 when the snippet exceeds 100 characters
//! - the source's authority bonus (see [`Source::authority_bonus`])
//!
//! Formula: `score = min(100, baseline + content_bonus + authority_bonus)`
//!
//! [`Source::authority_bonus`]: crate::types::Source::authority_bonus

use crate::types::SearchResult;

/// Snippets longer than this many characters earn [`CONTENT_BONUS`].
const RICH_SNIPPET_CHARS: usize = 100;

const CONTENT_BONUS: u8 = 5;

const MAX_SCORE: u8 = 100;

/// Calculate the ranked score for one result.
///
/// Pure: depends only on the result's current score, snippet, and source.
pub fn score_result(result: &SearchResult) -> u8 {
    let content_bonus = if result.snippet.chars().count() > RICH_SNIPPET_CHARS {
        CONTENT_BONUS
    } else {
        0
    };
    result
        .score
        .saturating_add(content_bonus)
        .saturating_add(result.source.authority_bonus())
        .min(MAX_SCORE)
}

/// Apply [`score_result`] to every result and sort by score descending.
///
/// The sort is stable: results with equal scores keep their input order.
pub fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    for result in &mut results {
        result.score = score_result(result);
    }
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results
}
