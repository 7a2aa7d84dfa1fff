//! Trait definition for pluggable source adapters.
//!
//! Each source (DuckDuckGo, Bing, Google, Wikipedia, arXiv) implements
//! [`SourceAdapter`] to turn one fetched response into normalised
//! [`SearchResult`] records.

use std::future::Future;

use crate::error::SearchError;
use crate::http::Fetcher;
use crate::types::{SearchResult, Source};

/// A pluggable search source.
///
/// Implementors handle their own:
///
/// - URL construction with query encoding
/// - response parsing (JSON schema, Atom feed, or CSS selectors)
/// - record validation (title, URL, minimum snippet length)
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
pub trait SourceAdapter: Send + Sync {
    /// Query the source and parse its response.
    ///
    /// Returns at most `desired` results.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the fetch fails or the response cannot
    /// be parsed.
    fn fetch_results(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    /// Which [`Source`] this adapter represents.
    fn source(&self) -> Source;

    /// Query the source, containing every failure.
    ///
    /// Errors are logged and turned into an empty list. Records without a
    /// title or URL are dropped, so callers only ever see valid results.
    fn search(
        &self,
        fetcher: &Fetcher,
        query: &str,
        desired: usize,
    ) -> impl Future<Output = Vec<SearchResult>> + Send {
        async move {
            let source = self.source();
            match self.fetch_results(fetcher, query, desired).await {
                Ok(results) => {
                    let mut valid: Vec<SearchResult> =
                        results.into_iter().filter(SearchResult::is_valid).collect();
                    valid.truncate(desired);
                    tracing::debug!(%source, count = valid.len(), "source returned results");
                    valid
                }
                Err(err) => {
                    tracing::warn!(%source, error = %err, "source query failed");
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;

    /// A mock adapter for testing trait bounds and failure containment.
    struct MockAdapter {
        source: Source,
        results: Vec<SearchResult>,
        fail: bool,
    }

    impl SourceAdapter for MockAdapter {
        async fn fetch_results(
            &self,
            _fetcher: &Fetcher,
            _query: &str,
            _desired: usize,
        ) -> Result<Vec<SearchResult>, SearchError> {
            if self.fail {
                return Err(SearchError::Parse("mock adapter failure".into()));
            }
            Ok(self.results.clone())
        }

        fn source(&self) -> Source {
            self.source
        }
    }

    fn result(title: &str, url: &str) -> SearchResult {
        SearchResult::new(Source::Bing, 1, title, url, "snippet", 80)
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(&SearchConfig::default()).expect("client builds")
    }

    #[test]
    fn mock_adapter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockAdapter>();
    }

    #[tokio::test]
    async fn failure_becomes_empty_list() {
        let adapter = MockAdapter {
            source: Source::Google,
            results: vec![result("A", "https://a.com")],
            fail: true,
        };
        let results = adapter.search(&fetcher(), "test", 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn fallible_call_still_propagates() {
        let adapter = MockAdapter {
            source: Source::Google,
            results: vec![],
            fail: true,
        };
        let err = adapter
            .fetch_results(&fetcher(), "test", 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("mock adapter failure"));
    }

    #[tokio::test]
    async fn invalid_records_are_dropped() {
        let adapter = MockAdapter {
            source: Source::Bing,
            results: vec![
                result("A", "https://a.com"),
                result("", "https://b.com"),
                result("C", ""),
            ],
            fail: false,
        };
        let results = adapter.search(&fetcher(), "test", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://a.com");
    }

    #[tokio::test]
    async fn output_bounded_by_desired() {
        let adapter = MockAdapter {
            source: Source::Bing,
            results: (0..8)
                .map(|i| result(&format!("T{i}"), &format!("https://{i}.com")))
                .collect(),
            fail: false,
        };
        let results = adapter.search(&fetcher(), "test", 3).await;
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn source_returns_correct_variant() {
        let adapter = MockAdapter {
            source: Source::Arxiv,
            results: vec![],
            fail: false,
        };
        assert_eq!(adapter.source(), Source::Arxiv);
    }
}
