//! Wikipedia full-text search: one authoritative article per query.

use serde::Deserialize;
use url::Url;

use crate::adapter::SourceAdapter;
use crate::content::{strip_markup, truncate_chars};
use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

use super::{endpoint_url, MAX_SNIPPET_CHARS};

/// Wikipedia MediaWiki search adapter.
pub struct WikipediaAdapter {
    base_url: String,
}

impl WikipediaAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for WikipediaAdapter {
    async fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Wikipedia search");

        let url = endpoint_url(
            &self.base_url,
            "/w/api.php",
            &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srprop", "snippet"),
                ("srlimit", "1"),
                ("format", "json"),
                ("utf8", "1"),
            ],
        )?;
        let body = fetcher.fetch(&url, Source::Wikipedia.fetch_timeout()).await?;

        parse_search_response(&body, &self.base_url, desired)
    }

    fn source(&self) -> Source {
        Source::Wikipedia
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<QueryBlock>,
}

#[derive(Debug, Deserialize)]
struct QueryBlock {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Build the article URL for `title` under `base`.
///
/// Any path on `base` is kept, as in [`endpoint_url`]. Spaces become
/// underscores and the title is percent-encoded as a single path segment.
fn article_url(base: &str, title: &str) -> Result<String, SearchError> {
    let mut url = Url::parse(base)
        .map_err(|e| SearchError::Config(format!("invalid endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| SearchError::Config(format!("endpoint cannot be a base: {base}")))?
        .pop_if_empty()
        .push("wiki")
        .push(&title.replace(' ', "_"));
    Ok(url.to_string())
}

fn parse_search_response(
    body: &[u8],
    base_url: &str,
    desired: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let response: ApiResponse = serde_json::from_slice(body)
        .map_err(|e| SearchError::Parse(format!("invalid Wikipedia JSON: {e}")))?;

    let hits = response.query.map(|q| q.search).unwrap_or_default();

    let mut results = Vec::new();
    for hit in hits.into_iter().take(desired.min(1)) {
        let title = hit.title.trim();
        if title.is_empty() {
            continue;
        }
        results.push(SearchResult::new(
            Source::Wikipedia,
            results.len() + 1,
            title,
            article_url(base_url, title)?,
            truncate_chars(&strip_markup(&hit.snippet), MAX_SNIPPET_CHARS),
            Source::Wikipedia.baseline_score(),
        ));
    }

    tracing::debug!(count = results.len(), "Wikipedia results parsed");
    Ok(results)
}
