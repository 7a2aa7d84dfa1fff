//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls timeouts, concurrency, request identity, and
//! where each source is reached. The defaults match the public endpoints.

use std::time::Duration;

use crate::error::SearchError;

/// Desktop browser identity sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:91.0) Gecko/20100101 Firefox/91.0";

/// Configuration for a search or extraction operation.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Upper bound on one source task inside the aggregator, in seconds.
    /// A task that runs longer contributes no results.
    pub source_timeout_seconds: u64,
    /// Maximum number of source tasks (or page extractions) in flight.
    pub max_concurrency: usize,
    /// How many top-ranked results get their pages extracted when a
    /// request asks for scraping.
    pub scrape_top_k: usize,
    /// Timeout for fetching a page to extract, in seconds.
    pub page_timeout_seconds: u64,
    /// Random delay range in milliseconds `(min, max)` before each source
    /// request. `(0, 0)` disables the delay.
    pub request_delay_ms: (u64, u64),
    /// Custom User-Agent string. If `None`, [`DEFAULT_USER_AGENT`] is used.
    pub user_agent: Option<String>,
    /// Base URLs for each source.
    pub endpoints: SourceEndpoints,
    /// Near-duplicate title thresholds.
    pub dedup: DedupThresholds,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            source_timeout_seconds: 15,
            max_concurrency: 5,
            scrape_top_k: 5,
            page_timeout_seconds: 15,
            request_delay_ms: (0, 0),
            user_agent: None,
            endpoints: SourceEndpoints::default(),
            dedup: DedupThresholds::default(),
        }
    }
}

impl SearchConfig {
    /// Per-task deadline applied by the aggregator.
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_seconds)
    }

    /// Fetch timeout for page extraction.
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    /// The User-Agent for outgoing requests.
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - both timeouts must be greater than 0
    /// - `max_concurrency` must be greater than 0
    /// - `request_delay_ms.0` must be <= `request_delay_ms.1`
    /// - every endpoint must be an absolute URL
    /// - dedup thresholds must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.source_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "source_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.page_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "page_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(SearchError::Config(
                "max_concurrency must be greater than 0".into(),
            ));
        }
        if self.request_delay_ms.0 > self.request_delay_ms.1 {
            return Err(SearchError::Config(
                "request_delay_ms min must be <= max".into(),
            ));
        }
        self.endpoints.validate()?;
        self.dedup.validate()
    }
}

/// Where each source is reached. Paths are appended by the adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEndpoints {
    pub duckduckgo: String,
    pub bing: String,
    pub google: String,
    pub wikipedia: String,
    pub arxiv: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            duckduckgo: "https://api.duckduckgo.com".into(),
            bing: "https://www.bing.com".into(),
            google: "https://www.google.com".into(),
            wikipedia: "https://en.wikipedia.org".into(),
            arxiv: "https://export.arxiv.org".into(),
        }
    }
}

impl SourceEndpoints {
    /// Point every source at one base URL, e.g. a local mock server.
    pub fn uniform(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_owned();
        Self {
            duckduckgo: base.clone(),
            bing: base.clone(),
            google: base.clone(),
            wikipedia: base.clone(),
            arxiv: base,
        }
    }

    fn validate(&self) -> Result<(), SearchError> {
        for (name, base) in [
            ("duckduckgo", &self.duckduckgo),
            ("bing", &self.bing),
            ("google", &self.google),
            ("wikipedia", &self.wikipedia),
            ("arxiv", &self.arxiv),
        ] {
            if url::Url::parse(base).is_err() {
                return Err(SearchError::Config(format!(
                    "{name} endpoint is not an absolute URL: {base}"
                )));
            }
        }
        Ok(())
    }
}

/// Thresholds for the near-duplicate title heuristic.
///
/// These are empirical. Titles sharing a long prefix but naming different
/// pages (e.g. numbered parts of a series) can be dropped as duplicates,
/// and reworded titles of the same page are never caught.
///
/// The prefix window shrinks to the shorter title, so a short title that
/// is a prefix of a slightly longer one always matches: `"C"` drops
/// `"C#"` and `"C++"`, and `"Go"` drops `"Go 1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupThresholds {
    /// Titles whose lengths differ by less than this may be duplicates.
    pub length_tolerance: usize,
    /// How many leading characters must match.
    pub prefix_chars: usize,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            length_tolerance: 5,
            prefix_chars: 30,
        }
    }
}

impl DedupThresholds {
    fn validate(&self) -> Result<(), SearchError> {
        if self.length_tolerance == 0 || self.prefix_chars == 0 {
            return Err(SearchError::Config(
                "dedup thresholds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
