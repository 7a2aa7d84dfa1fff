//! Bing search engine: primary scraped web index.
//!
//! Bing wraps many result links in `/ck/a` click-tracking redirects whose
//! `u` parameter carries the destination as `a1` + URL-safe base64. Those
//! are unwrapped during parsing so results point at the real page.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use scraper::{Html, Selector};
use url::Url;

use crate::adapter::SourceAdapter;
use crate::content::{collapse_whitespace, truncate_chars};
use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

use super::{endpoint_url, MAX_SNIPPET_CHARS, MAX_TITLE_CHARS};

/// Snippets this short are usually ads or sitelinks.
const MIN_SNIPPET_CHARS: usize = 20;

/// Results requested per page; Bing ignores larger values.
const RESULTS_PER_PAGE: &str = "50";

/// Bing HTML search scraper.
pub struct BingAdapter {
    base_url: String,
}

impl BingAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SourceAdapter for BingAdapter {
    async fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        tracing::trace!(query, "Bing search");

        let url = endpoint_url(
            &self.base_url,
            "/search",
            &[("q", query), ("count", RESULTS_PER_PAGE), ("setlang", "en")],
        )?;
        let html = fetcher.fetch_text(&url, Source::Bing.fetch_timeout()).await?;

        tracing::trace!(bytes = html.len(), "Bing response received");

        parse_bing_html(&html, desired)
    }

    fn source(&self) -> Source {
        Source::Bing
    }
}

/// Extract the destination from a Bing click-tracking wrapper.
///
/// Returns the input unchanged when it is not a wrapper or the payload
/// does not decode to an absolute URL.
fn unwrap_redirect(href: &str) -> String {
    let Ok(parsed) = Url::parse(href) else {
        return href.to_owned();
    };
    let is_wrapper = parsed
        .host_str()
        .is_some_and(|host| host == "bing.com" || host.ends_with(".bing.com"))
        && parsed.path().starts_with("/ck/a");
    if !is_wrapper {
        return href.to_owned();
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == "u")
        .and_then(|(_, value)| {
            let payload = value.strip_prefix("a1")?.trim_end_matches('=').to_owned();
            let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
            let decoded = String::from_utf8(bytes).ok()?;
            decoded.starts_with("http").then_some(decoded)
        })
        .unwrap_or_else(|| href.to_owned())
}

/// Parse Bing HTML response into search results.
///
/// Extracted as a separate function for testability with mock HTML.
fn parse_bing_html(html: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);

    // Organic results live in li.b_algo containers.
    let result_sel = Selector::parse("li.b_algo")
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse("h2")
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let link_sel = Selector::parse("a[href]")
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;
    let snippet_sel = Selector::parse("p")
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }

        let Some(title_el) = element.select(&title_sel).next() else {
            continue;
        };
        let title = collapse_whitespace(&title_el.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        // URL from h2 > a[href]
        let url = match title_el
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
            Source::Bing,
            results.len() + 1,
            truncate_chars(&title, MAX_TITLE_CHARS),
            url,
            truncate_chars(&snippet, MAX_SNIPPET_CHARS),
            Source::Bing.baseline_score(),
        ));
    }

    tracing::debug!(count = results.len(), "Bing results parsed");
    Ok(results)
}
