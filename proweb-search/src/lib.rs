//! # proweb-search
//!
//! Multi-source web search aggregation and page extraction.
//!
//! This crate queries public sources directly, without API keys or external
//! services, and merges their answers into one ranked result list.
//!
//! ## Design
//!
//! - Five sources: DuckDuckGo instant answers, Bing and Google HTML
//!   results, Wikipedia search, and arXiv papers
//! - Sources are queried concurrently in a bounded pool, each under its
//!   own timeout; a failing source contributes nothing instead of failing
//!   the search
//! - Results are deduplicated by URL and near-duplicate title, then ranked
//!   by source baseline plus content and authority bonuses
//! - Optional structured extraction of the top result pages
//!
//! ## Security
//!
//! - No API keys or secrets to leak
//! - No network listeners; this is a library, not a server
//! - Search queries are logged only at trace level

pub mod adapter;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod sources;
pub mod types;

pub use adapter::SourceAdapter;
pub use config::{DedupThresholds, SearchConfig, SourceEndpoints};
pub use content::{ExtractFields, ExtractMode};
pub use error::{FetchError, Result, SearchError};
pub use types::{
    Image, Link, PageContent, ScrapedContent, SearchReport, SearchRequest, SearchResult, Source,
};

/// Run a search request across its sources and return the ranked report.
///
/// Queries every source in `request.sources` concurrently, deduplicates
/// and ranks the merged results, truncates to `request.count`, and
/// extracts the top pages when `request.scrape` is set.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the request or configuration is
/// invalid. Individual source failures are logged but never fail the
/// search; if every source fails the report is simply empty.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> proweb_search::Result<()> {
/// use proweb_search::{SearchConfig, SearchRequest, Source};
///
/// let request = SearchRequest::new("rust programming", [Source::DuckDuckGo, Source::Bing], 10)?;
/// let report = proweb_search::search(&request, &SearchConfig::default()).await?;
/// for result in &report.results {
///     println!("{} {}: {}", result.score, result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(request: &SearchRequest, config: &SearchConfig) -> Result<SearchReport> {
    orchestrator::pipeline::run_pipeline(request, config).await
}

/// Fetch one page and extract structured content from it.
///
/// Uses `config.page_timeout()` for the fetch. Which fields are populated
/// depends on `mode`.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `url` is not an absolute HTTP(S)
/// URL or the configuration is invalid, and [`SearchError::Transport`] if
/// the page cannot be fetched.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> proweb_search::Result<()> {
/// use proweb_search::{ExtractMode, SearchConfig};
///
/// let page = proweb_search::fetch_page_content(
///     "https://example.com",
///     ExtractMode::Text,
///     &SearchConfig::default(),
/// )
/// .await?;
/// println!("Title: {}", page.title);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_page_content(
    url: &str,
    mode: ExtractMode,
    config: &SearchConfig,
) -> Result<PageContent> {
    config.validate()?;
    let parsed = url::Url::parse(url)
        .map_err(|e| SearchError::Config(format!("invalid URL {url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SearchError::Config(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }

    let fetcher = http::Fetcher::new(config)?;
    content::fetch_and_extract(&fetcher, url, mode, config.page_timeout()).await
}
