//! arXiv query API: academic papers from an Atom feed.

use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::content::{collapse_whitespace, truncate_chars};
use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

use super::{endpoint_url, MAX_SNIPPET_CHARS, MAX_TITLE_CHARS};

/// arXiv Atom API adapter.
pub struct ArxivAdapter {
    base_url: String,
}

impl ArxivAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for ArxivAdapter {
    async fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "arXiv search");

        let search_query = format!("all:{query}");
        let max_results = desired.to_string();
        let url = endpoint_url(
            &self.base_url,
            "/api/query",
            &[
                ("search_query", search_query.as_str()),
                ("start", "0"),
                ("max_results", max_results.as_str()),
            ],
        )?;
        let xml = fetcher.fetch_text(&url, Source::Arxiv.fetch_timeout()).await?;

        parse_atom_feed(&xml, desired)
    }

    fn source(&self) -> Source {
        Source::Arxiv
    }
}

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
}

fn parse_atom_feed(xml: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let feed: Feed = quick_xml::de::from_str(xml)
        .map_err(|e| SearchError::Parse(format!("invalid Atom feed: {e}")))?;

    let mut results = Vec::new();
    for entry in feed.entries {
        if results.len() >= max_results {
            break;
        }
        let title = collapse_whitespace(&entry.title);
        let url = entry.id.trim();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchResult::new(
            Source::Arxiv,
            results.len() + 1,
            truncate_chars(&title, MAX_TITLE_CHARS),
            url,
            truncate_chars(&collapse_whitespace(&entry.summary), MAX_SNIPPET_CHARS),
            Source::Arxiv.baseline_score(),
        ));
    }

    tracing::debug!(count = results.len(), "arXiv results parsed");
    Ok(results)
}
