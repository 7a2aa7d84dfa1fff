//! Shared HTTP fetcher for source adapters and page extraction.
//!
//! Wraps one configured [`reqwest::Client`] with a browser-like identity,
//! cookie support, and redirect following. Every fetch is bounded by the
//! caller's timeout and never retried.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::SearchConfig;
use crate::error::FetchError;

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Issues single GET requests on behalf of adapters and the extractor.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher configured for API calls and scraping.
    ///
    /// The client has:
    /// - Cookie store enabled (for consent pages, etc.)
    /// - The configured or default desktop User-Agent
    /// - Up to 10 redirects followed
    /// - Brotli and gzip decompression
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// GET `url` and return the raw body.
    ///
    /// `timeout` bounds the whole exchange, including reading the body.
    ///
    /// # Errors
    ///
    /// [`FetchError::Timeout`] when the deadline passes,
    /// [`FetchError::Status`] for non-2xx responses after redirects, and
    /// [`FetchError::Network`] for everything else.
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        let body = bounded(url, timeout, async {
            let response = self.get(url, timeout).await?;
            response.bytes().await.map_err(classify)
        })
        .await?;
        tracing::trace!(url, bytes = body.len(), "response received");
        Ok(body.to_vec())
    }

    /// Same as [`Fetcher::fetch`] but decodes the body as text.
    ///
    /// The charset comes from the response `Content-Type`, falling back to
    /// UTF-8. Invalid sequences are replaced.
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let text = bounded(url, timeout, async {
            let response = self.get(url, timeout).await?;
            response.text_with_charset("utf-8").await.map_err(classify)
        })
        .await?;
        tracing::trace!(url, chars = text.len(), "response received");
        Ok(text)
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, FetchError> {
        tracing::trace!(url, timeout_ms = timeout.as_millis() as u64, "fetch");

        let response = self
            .client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

/// Run `exchange` under a hard deadline.
async fn bounded<T>(
    url: &str,
    timeout: Duration,
    exchange: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    match tokio::time::timeout(timeout, exchange).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::Timeout(format!(
            "{url} exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

/// Pick a random pre-request delay from an inclusive millisecond range.
pub fn jitter_delay((min, max): (u64, u64)) -> Duration {
    if max == 0 || min >= max {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min..=max))
}
