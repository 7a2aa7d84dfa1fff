//! Pipeline driver: aggregate, dedup, rank, truncate, optionally extract.

use futures::StreamExt;

use crate::config::SearchConfig;
use crate::content::{fetch_and_extract, ExtractMode};
use crate::error::Result;
use crate::http::Fetcher;
use crate::types::{ScrapedContent, SearchReport, SearchRequest, SearchResult};

use super::aggregate::aggregate;
use super::dedup::deduplicate;
use super::scoring::rank;

/// Run one search request end to end.
///
/// # Pipeline
///
/// 1. Fan out to `request.sources` (see [`aggregate`])
/// 2. Drop exact-URL and near-duplicate title repeats
/// 3. Score and stable-sort by score
/// 4. Truncate to `request.count`
/// 5. When `request.scrape` is set, extract the top `config.scrape_top_k`
///    pages in rank order and attach the outcome to each result
///
/// # Errors
///
/// Returns [`crate::SearchError::Config`] for an invalid request or
/// configuration, and [`crate::SearchError::Transport`] if the HTTP client
/// cannot be built. Source and page failures never surface here.
pub async fn run_pipeline(request: &SearchRequest, config: &SearchConfig) -> Result<SearchReport> {
    request.validate()?;
    config.validate()?;

    tracing::trace!(query = %request.query, "search pipeline started");

    let fetcher = Fetcher::new(config)?;

    let combined = aggregate(
        &request.query,
        &request.sources,
        request.count,
        config,
        &fetcher,
    )
    .await;
    let total_combined = combined.len();

    let deduped = deduplicate(combined, &config.dedup);
    let total_deduplicated = deduped.len();

    let mut results = rank(deduped);
    results.truncate(request.count);

    if let Some(mode) = request.scrape {
        attach_page_content(&mut results, mode, config, &fetcher).await;
    }

    tracing::info!(
        total_combined,
        total_deduplicated,
        count = results.len(),
        "search complete"
    );

    Ok(SearchReport {
        query: request.query.clone(),
        sources: request.sources.clone(),
        count: results.len(),
        results,
        total_combined,
        total_deduplicated,
    })
}

/// Extract the top-K result pages, preserving rank order.
async fn attach_page_content(
    results: &mut [SearchResult],
    mode: ExtractMode,
    config: &SearchConfig,
    fetcher: &Fetcher,
) {
    let top_k = config.scrape_top_k.min(results.len());
    let timeout = config.page_timeout();
    let urls: Vec<String> = results[..top_k].iter().map(|r| r.url.clone()).collect();

    let outcomes: Vec<ScrapedContent> = futures::stream::iter(urls.into_iter().map(|url| async move {
        match fetch_and_extract(fetcher, &url, mode, timeout).await {
            Ok(page) => ScrapedContent::Page(page),
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "page extraction failed");
                ScrapedContent::Failed {
                    error: err.to_string(),
                    url,
                }
            }
        }
    }))
    .buffered(config.max_concurrency.max(1))
    .collect()
    .await;

    for (result, content) in results.iter_mut().zip(outcomes) {
        result.scraped_content = Some(Box::new(content));
    }
}
