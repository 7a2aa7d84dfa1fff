//! Source adapter implementations.
//!
//! Each module provides a struct implementing [`crate::adapter::SourceAdapter`]
//! for one external source, plus a pure parse function over the raw response
//! so the parsing rules can be tested against captured bodies.

pub mod arxiv;
pub mod bing;
pub mod duckduckgo;
pub mod google;
pub mod wikipedia;

pub use arxiv::ArxivAdapter;
pub use bing::BingAdapter;
pub use duckduckgo::DuckDuckGoAdapter;
pub use google::GoogleAdapter;
pub use wikipedia::WikipediaAdapter;

use crate::error::SearchError;

/// Titles from scraped engines and the academic index are capped at this.
pub(crate) const MAX_TITLE_CHARS: usize = 100;

/// Every snippet is capped at this.
pub(crate) const MAX_SNIPPET_CHARS: usize = 500;

/// Join `path` onto an endpoint base and append URL-encoded query parameters.
pub(crate) fn endpoint_url(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<String, SearchError> {
    let joined = format!("{}{path}", base.trim_end_matches('/'));
    url::Url::parse_with_params(&joined, params)
        .map(|url| url.to_string())
        .map_err(|e| SearchError::Config(format!("invalid endpoint {joined}: {e}")))
}
