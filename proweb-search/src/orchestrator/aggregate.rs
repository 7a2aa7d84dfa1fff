//! Concurrent fan-out to the requested sources.
//!
//! Every source runs as one task in a bounded pool. Each task is wrapped
//! in a timeout, so a slow source is cancelled and contributes nothing
//! while the others complete normally.

use futures::StreamExt;

use crate::adapter::SourceAdapter;
use crate::config::SearchConfig;
use crate::http::{jitter_delay, Fetcher};
use crate::sources::{ArxivAdapter, BingAdapter, DuckDuckGoAdapter, GoogleAdapter, WikipediaAdapter};
use crate::types::{SearchResult, Source};

/// Query every source in `sources` concurrently and collect their results.
///
/// # Pipeline
///
/// 1. One task per source, at most `config.max_concurrency` in flight
/// 2. Optional random delay before each task's request
/// 3. Each task bounded by `config.source_timeout()`
/// 4. Results concatenated in task completion order
///
/// Never fails: a source that errors or times out is logged and
/// contributes zero results.
pub async fn aggregate(
    query: &str,
    sources: &[Source],
    desired: usize,
    config: &SearchConfig,
    fetcher: &Fetcher,
) -> Vec<SearchResult> {
    let timeout = config.source_timeout();

    let mut tasks = futures::stream::iter(sources.iter().copied().map(|source| async move {
        let outcome =
            tokio::time::timeout(timeout, query_source(source, query, desired, config, fetcher))
                .await;
        (source, outcome)
    }))
    .buffer_unordered(config.max_concurrency.max(1));

    let mut collected = Vec::new();
    while let Some((source, outcome)) = tasks.next().await {
        match outcome {
            Ok(results) => collected.extend(results),
            Err(_) => {
                tracing::warn!(%source, timeout_ms = timeout.as_millis() as u64, "source timed out");
            }
        }
    }

    tracing::debug!(sources = sources.len(), collected = collected.len(), "aggregation finished");
    collected
}

/// Query a single source, dispatching to the concrete adapter.
async fn query_source(
    source: Source,
    query: &str,
    desired: usize,
    config: &SearchConfig,
    fetcher: &Fetcher,
) -> Vec<SearchResult> {
    let delay = jitter_delay(config.request_delay_ms);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let endpoints = &config.endpoints;
    match source {
        Source::DuckDuckGo => {
            DuckDuckGoAdapter::new(&endpoints.duckduckgo)
                .search(fetcher, query, desired)
                .await
        }
        Source::Bing => BingAdapter::new(&endpoints.bing).search(fetcher, query, desired).await,
        Source::Google => {
            GoogleAdapter::new(&endpoints.google)
                .search(fetcher, query, desired)
                .await
        }
        Source::Wikipedia => {
            WikipediaAdapter::new(&endpoints.wikipedia)
                .search(fetcher, query, desired)
                .await
        }
        Source::Arxiv => ArxivAdapter::new(&endpoints.arxiv).search(fetcher, query, desired).await,
    }
}
