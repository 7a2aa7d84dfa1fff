//! Google search engine: secondary scraped index, aggressive bot detection.
//!
//! Google answers automated requests with consent walls, CAPTCHAs, or
//! near-empty pages. A body under 1000 bytes is treated as rate limiting
//! and yields no results rather than an error.

use scraper::{Html, Selector};
use url::Url;

use crate::adapter::SourceAdapter;
use crate::content::{collapse_whitespace, truncate_chars};
use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

use super::{endpoint_url, MAX_SNIPPET_CHARS, MAX_TITLE_CHARS};

/// Bodies smaller than this are block pages, not result pages.
const MIN_BODY_BYTES: usize = 1000;

const MIN_SNIPPET_CHARS: usize = 10;

/// Google HTML search scraper.
pub struct GoogleAdapter {
    base_url: String,
}

impl GoogleAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for GoogleAdapter {
    async fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Google search");

        let num = desired.to_string();
        let url = endpoint_url(
            &self.base_url,
            "/search",
            &[("q", query), ("num", &num), ("hl", "en")],
        )?;
        let html = fetcher.fetch_text(&url, Source::Google.fetch_timeout()).await?;

        parse_google_html(&html, desired)
    }

    fn source(&self) -> Source {
        Source::Google
    }
}

/// Resolve `/url?q=<destination>&...` wrappers to the destination.
fn unwrap_redirect(href: &str) -> String {
    if !href.starts_with("/url?") {
        return href.to_owned();
    }
    Url::parse("https://www.google.com")
        .and_then(|base| base.join(href))
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|destination| !destination.is_empty())
        .unwrap_or_else(|| href.to_owned())
}

/// Parse Google HTML response into search results.
fn parse_google_html(html: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    if html.len() < MIN_BODY_BYTES {
        tracing::debug!(bytes = html.len(), "Google body too short, treating as rate limited");
        return Ok(Vec::new());
    }

    let document = Html::parse_document(html);

    let result_sel = Selector::parse("div.g")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h3")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let snippet_sel = Selector::parse(".VwiC3b")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let title = element
            .select(&title_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let url = match element
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
        {
            Some(href) if !href.is_empty() => unwrap_redirect(href),
            _ => continue,
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();
        if snippet.chars().count() <= MIN_SNIPPET_CHARS {
            continue;
        }

        results.push(SearchResult::new(
            Source::Google,
            results.len() + 1,
            truncate_chars(&title, MAX_TITLE_CHARS),
            url,
            truncate_chars(&snippet, MAX_SNIPPET_CHARS),
            Source::Google.baseline_score(),
        ));
    }

    tracing::debug!(count = results.len(), "Google results parsed");
    Ok(results)
}
