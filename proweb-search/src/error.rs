//! Error types for the proweb-search crate.
//!
//! Transport and parse failures are contained at the source adapter and
//! extractor boundaries; only [`SearchError::Config`] ever reaches the
//! caller of the search pipeline.

/// A failed HTTP fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within its timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS, redirect, or body read failure.
    #[error("network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status code.
    #[error("non-success status: {0}")]
    Status(u16),
}

/// Errors that can occur during search and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The HTTP layer failed.
    #[error("transport error: {0}")]
    Transport(#[from] FetchError),

    /// A source response or page could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration or request.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for proweb-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
