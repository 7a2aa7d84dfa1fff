//! DuckDuckGo instant-answer API: curated abstract plus related topics.
//!
//! The JSON API at `https://api.duckduckgo.com/` returns at most one
//! abstract (usually sourced from Wikipedia) and a list of related topics.
//! It is not a web index, so many queries return nothing.

use serde::Deserialize;

use crate::adapter::SourceAdapter;
use crate::content::truncate_chars;
use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

use super::{endpoint_url, MAX_SNIPPET_CHARS};

/// Baseline for a related topic, below the abstract's.
const RELATED_TOPIC_SCORE: u8 = 75;

/// Related-topic titles without a `" - "` separator are cut to this.
const MAX_TOPIC_TITLE_CHARS: usize = 60;

/// DuckDuckGo instant-answer adapter.
pub struct DuckDuckGoAdapter {
    base_url: String,
}

impl DuckDuckGoAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for DuckDuckGoAdapter {
    async fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "DuckDuckGo instant answer");

        let url = endpoint_url(
            &self.base_url,
            "/",
            &[("q", query), ("format", "json"), ("t", "proweb"), ("ia", "web")],
        )?;
        let body = fetcher.fetch(&url, Source::DuckDuckGo.fetch_timeout()).await?;

        parse_instant_answer(&body, query, desired)
    }

    fn source(&self) -> Source {
        Source::DuckDuckGo
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InstantAnswer {
    #[serde(rename = "Heading")]
    heading: Option<String>,
    #[serde(rename = "AbstractText")]
    abstract_text: Option<String>,
    #[serde(rename = "AbstractURL")]
    abstract_url: Option<String>,
    #[serde(rename = "RelatedTopics")]
    related_topics: Vec<RelatedTopic>,
}

/// Entries are either plain topics or named groups of nested topics.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Group {
        #[serde(rename = "Topics")]
        #[allow(dead_code)]
        topics: serde::de::IgnoredAny,
    },
    Topic {
        #[serde(rename = "Text", default)]
        text: Option<String>,
        #[serde(rename = "FirstURL", default)]
        first_url: Option<String>,
    },
    Other(serde::de::IgnoredAny),
}

/// Parse an instant-answer response body.
///
/// Emits the abstract first (when present), then related topics in
/// response order, stopping once `desired` results are collected.
fn parse_instant_answer(
    body: &[u8],
    query: &str,
    desired: usize,
) -> Result<Vec<SearchResult>, SearchError> {
    let answer: InstantAnswer = serde_json::from_slice(body)
        .map_err(|e| SearchError::Parse(format!("invalid instant-answer JSON: {e}")))?;

    let mut results = Vec::new();

    let abstract_text = answer.abstract_text.unwrap_or_default();
    let abstract_url = answer.abstract_url.unwrap_or_default();
    if desired > 0 && !abstract_text.trim().is_empty() && !abstract_url.trim().is_empty() {
        let heading = answer.heading.unwrap_or_default();
        let title = if heading.trim().is_empty() {
            query.to_owned()
        } else {
            heading.trim().to_owned()
        };
        results.push(SearchResult::new(
            Source::DuckDuckGo,
            1,
            title,
            abstract_url.trim(),
            truncate_chars(abstract_text.trim(), MAX_SNIPPET_CHARS),
            Source::DuckDuckGo.baseline_score(),
        ));
    }

    for topic in answer.related_topics {
        if results.len() >= desired {
            break;
        }
        let RelatedTopic::Topic { text, first_url } = topic else {
            continue;
        };
        let text = text.unwrap_or_default();
        let url = first_url.unwrap_or_default();
        let text = text.trim();
        if text.chars().count() <= 5 || url.trim().is_empty() {
            continue;
        }
        let title = match text.split_once(" - ") {
            Some((head, _)) => head.to_owned(),
            None => truncate_chars(text, MAX_TOPIC_TITLE_CHARS),
        };
        results.push(SearchResult::new(
            Source::DuckDuckGo,
            results.len() + 1,
            title,
            url.trim(),
            truncate_chars(text, MAX_SNIPPET_CHARS),
            RELATED_TOPIC_SCORE,
        ));
    }

    tracing::debug!(count = results.len(), "DuckDuckGo results parsed");
    Ok(results)
}
