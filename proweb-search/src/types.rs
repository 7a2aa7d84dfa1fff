//! Core types for search results, sources, requests, and extracted pages.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ExtractMode;
use crate::error::SearchError;

/// A single normalised record produced by a source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position assigned by the adapter. Not unique across sources.
    pub rank: usize,
    /// The title of the result.
    pub title: String,
    /// The destination URL, with engine redirect wrappers removed.
    pub url: String,
    /// A text snippet summarising the page content (at most 500 chars).
    pub snippet: String,
    /// Which source produced this result.
    pub source: Source,
    /// Informational relevance in `[0, 1]`; never used for ordering.
    pub relevance: f64,
    /// Ranking key in `[0, 100]`. Starts at the adapter baseline and is
    /// adjusted once by the ranker.
    pub score: u8,
    /// Page content attached by the pipeline when scraping is requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_content: Option<Box<ScrapedContent>>,
}

impl SearchResult {
    /// Build a result with relevance derived from the baseline score.
    pub fn new(
        source: Source,
        rank: usize,
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
        score: u8,
    ) -> Self {
        let score = score.min(100);
        Self {
            rank,
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source,
            relevance: f64::from(score) / 100.0,
            score,
            scraped_content: None,
        }
    }

    /// Whether this record may be retained past the adapter stage.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// The closed set of sources the aggregator can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// DuckDuckGo instant-answer API: abstract plus related topics.
    #[serde(rename = "ddg")]
    DuckDuckGo,
    /// Bing HTML results: primary scraped engine.
    #[serde(rename = "bing")]
    Bing,
    /// Google HTML results: secondary scraped engine, often rate limited.
    #[serde(rename = "google")]
    Google,
    /// Wikipedia full-text search: structured knowledge.
    #[serde(rename = "wikipedia")]
    Wikipedia,
    /// arXiv Atom API: academic papers.
    #[serde(rename = "arxiv")]
    Arxiv,
}

impl Source {
    /// Short identifier used on the command line and in output documents.
    pub fn id(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "ddg",
            Self::Bing => "bing",
            Self::Google => "google",
            Self::Wikipedia => "wikipedia",
            Self::Arxiv => "arxiv",
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Bing => "Bing",
            Self::Google => "Google",
            Self::Wikipedia => "Wikipedia",
            Self::Arxiv => "arXiv",
        }
    }

    /// Adapter-assigned baseline score before ranking.
    ///
    /// Only the relative ordering between sources is meaningful.
    pub fn baseline_score(&self) -> u8 {
        match self {
            Self::DuckDuckGo => 95,
            Self::Wikipedia => 85,
            Self::Bing => 80,
            Self::Arxiv => 75,
            Self::Google => 70,
        }
    }

    /// Authority bonus layered on top of the baseline by the ranker.
    pub fn authority_bonus(&self) -> u8 {
        match self {
            Self::Wikipedia => 20,
            Self::DuckDuckGo => 15,
            Self::Arxiv => 10,
            Self::Bing | Self::Google => 0,
        }
    }

    /// Upper bound on a single fetch against this source.
    pub fn fetch_timeout(&self) -> Duration {
        match self {
            Self::DuckDuckGo | Self::Wikipedia => Duration::from_secs(8),
            Self::Arxiv => Duration::from_secs(10),
            Self::Bing | Self::Google => Duration::from_secs(12),
        }
    }

    /// Returns all available sources.
    pub fn all() -> &'static [Source] {
        &[
            Self::DuckDuckGo,
            Self::Bing,
            Self::Google,
            Self::Wikipedia,
            Self::Arxiv,
        ]
    }

    /// Parse a comma-separated source list.
    ///
    /// Unknown identifiers are skipped and repeats collapse to their first
    /// occurrence, so the returned order follows the input.
    pub fn parse_list(list: &str) -> Vec<Source> {
        let mut sources = Vec::new();
        for raw in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match raw.parse::<Source>() {
                Ok(source) if !sources.contains(&source) => sources.push(source),
                Ok(_) => {}
                Err(_) => tracing::debug!(source = raw, "ignoring unknown source identifier"),
            }
        }
        sources
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Source {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ddg" | "duckduckgo" | "instant-answer" => Ok(Self::DuckDuckGo),
            "bing" | "engine-a" => Ok(Self::Bing),
            "google" | "engine-b" => Ok(Self::Google),
            "wikipedia" | "knowledge-base" => Ok(Self::Wikipedia),
            "arxiv" | "academic-index" => Ok(Self::Arxiv),
            other => Err(SearchError::Config(format!("unknown source: {other}"))),
        }
    }
}

/// The query context for one pipeline run.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// The search query string.
    pub query: String,
    /// Sources to fan out to, in request order, without repeats.
    pub sources: Vec<Source>,
    /// How many results to return after ranking.
    pub count: usize,
    /// Extract page content for the top results using this mode.
    pub scrape: Option<ExtractMode>,
}

impl SearchRequest {
    /// Build and validate a request. Repeated sources are collapsed.
    pub fn new(
        query: impl Into<String>,
        sources: impl IntoIterator<Item = Source>,
        count: usize,
    ) -> Result<Self, SearchError> {
        let mut unique = Vec::new();
        for source in sources {
            if !unique.contains(&source) {
                unique.push(source);
            }
        }
        let request = Self {
            query: query.into(),
            sources: unique,
            count,
            scrape: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// Request top-result extraction with the given mode.
    pub fn with_scrape(mut self, mode: ExtractMode) -> Self {
        self.scrape = Some(mode);
        self
    }

    /// Checks the query is non-blank and the count is positive.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::Config("query must not be empty".into()));
        }
        if self.count == 0 {
            return Err(SearchError::Config("count must be greater than 0".into()));
        }
        Ok(())
    }
}

/// The document produced by one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    /// The query as submitted.
    pub query: String,
    /// Sources that were queried.
    pub sources: Vec<Source>,
    /// Number of results returned.
    pub count: usize,
    /// Ranked, deduplicated, truncated results.
    pub results: Vec<SearchResult>,
    /// Results collected from all sources before deduplication.
    pub total_combined: usize,
    /// Results remaining after deduplication, before truncation.
    pub total_deduplicated: usize,
}

/// Outcome of extracting one result's page during a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapedContent {
    /// Extraction succeeded.
    Page(PageContent),
    /// Fetch or extraction failed for this result only.
    Failed {
        /// Why extraction failed.
        error: String,
        /// The URL that was attempted.
        url: String,
    },
}

/// A hyperlink kept by the content extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// An image reference kept by the content extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    pub alt: String,
}

/// Structured content extracted from one HTML page.
///
/// Fields that the extraction mode did not select, or that came out empty,
/// are omitted when serialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// The URL the page was extracted from.
    pub url: String,
    /// Contents of the `<title>` element, trimmed.
    pub title: String,
    /// Main readable text, whitespace collapsed and capped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Character count of the main text before truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
    /// Up to five `h1`–`h3` headings in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headings: Vec<String>,
    /// Open Graph properties with the `og:` prefix removed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Up to twenty content links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    /// Number of links that passed filtering, before the output cap.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub link_count: usize,
    /// Up to ten images.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub image_count: usize,
    /// When the extraction ran, serialised as Unix seconds.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub scraped_at: DateTime<Utc>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(source: Source) -> SearchResult {
        SearchResult::new(
            source,
            1,
            "Example",
            "https://example.com",
            "An example page",
            source.baseline_score(),
        )
    }

    #[test]
    fn new_result_derives_relevance_from_score() {
        let result = make_result(Source::Bing);
        assert_eq!(result.score, 80);
        assert!((result.relevance - 0.80).abs() < f64::EPSILON);
        assert!(result.scraped_content.is_none());
    }

    #[test]
    fn new_result_clamps_score() {
        let result = SearchResult::new(Source::Bing, 1, "t", "u", "s", 250);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn validity_requires_title_and_url() {
        assert!(make_result(Source::Google).is_valid());

        let mut no_title = make_result(Source::Google);
        no_title.title = "   ".into();
        assert!(!no_title.is_valid());

        let mut no_url = make_result(Source::Google);
        no_url.url.clear();
        assert!(!no_url.is_valid());
    }

    #[test]
    fn source_serializes_as_identifier() {
        let json = serde_json::to_string(&Source::DuckDuckGo).expect("serialize");
        assert_eq!(json, "\"ddg\"");
        let decoded: Source = serde_json::from_str("\"arxiv\"").expect("deserialize");
        assert_eq!(decoded, Source::Arxiv);
    }

    #[test]
    fn source_parses_identifiers_and_role_aliases() {
        assert_eq!("ddg".parse::<Source>().ok(), Some(Source::DuckDuckGo));
        assert_eq!("instant-answer".parse::<Source>().ok(), Some(Source::DuckDuckGo));
        assert_eq!("engine-a".parse::<Source>().ok(), Some(Source::Bing));
        assert_eq!("engine-b".parse::<Source>().ok(), Some(Source::Google));
        assert_eq!("knowledge-base".parse::<Source>().ok(), Some(Source::Wikipedia));
        assert_eq!("academic-index".parse::<Source>().ok(), Some(Source::Arxiv));
        assert_eq!(" Bing ".parse::<Source>().ok(), Some(Source::Bing));
        assert!("yahoo".parse::<Source>().is_err());
    }

    #[test]
    fn parse_list_ignores_unknown_and_repeats() {
        let sources = Source::parse_list("ddg,yahoo,bing,,ddg,arxiv");
        assert_eq!(sources, vec![Source::DuckDuckGo, Source::Bing, Source::Arxiv]);
    }

    #[test]
    fn parse_list_of_only_unknown_is_empty() {
        assert!(Source::parse_list("altavista,lycos").is_empty());
    }

    #[test]
    fn baselines_keep_relative_order() {
        assert!(Source::DuckDuckGo.baseline_score() > Source::Wikipedia.baseline_score());
        assert!(Source::Wikipedia.baseline_score() > Source::Bing.baseline_score());
        assert!(Source::Bing.baseline_score() > Source::Arxiv.baseline_score());
        assert!(Source::Arxiv.baseline_score() > Source::Google.baseline_score());
    }

    #[test]
    fn authority_bonuses() {
        assert_eq!(Source::Wikipedia.authority_bonus(), 20);
        assert_eq!(Source::DuckDuckGo.authority_bonus(), 15);
        assert_eq!(Source::Arxiv.authority_bonus(), 10);
        assert_eq!(Source::Bing.authority_bonus(), 0);
        assert_eq!(Source::Google.authority_bonus(), 0);
    }

    #[test]
    fn all_sources_listed() {
        let all = Source::all();
        assert_eq!(all.len(), 5);
        assert!(all.contains(&Source::Wikipedia));
    }

    #[test]
    fn request_collapses_repeated_sources() {
        let request = SearchRequest::new(
            "rust",
            [Source::Bing, Source::DuckDuckGo, Source::Bing],
            10,
        )
        .expect("valid request");
        assert_eq!(request.sources, vec![Source::Bing, Source::DuckDuckGo]);
        assert!(request.scrape.is_none());
    }

    #[test]
    fn request_rejects_blank_query() {
        let err = SearchRequest::new("  ", [Source::Bing], 10).unwrap_err();
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn request_rejects_zero_count() {
        let err = SearchRequest::new("rust", [Source::Bing], 0).unwrap_err();
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn page_content_omits_empty_subsets() {
        let page = PageContent {
            url: "https://example.com".into(),
            title: "Example".into(),
            text: None,
            text_length: None,
            headings: vec![],
            metadata: BTreeMap::new(),
            links: vec![],
            link_count: 0,
            images: vec![],
            image_count: 0,
            scraped_at: DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp"),
        };
        let value = serde_json::to_value(&page).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 3);
        assert_eq!(object["scraped_at"], 1_700_000_000);
        assert!(!object.contains_key("links"));
    }

    #[test]
    fn failed_scrape_serializes_error_field() {
        let failed = ScrapedContent::Failed {
            error: "request timed out: page".into(),
            url: "https://example.com".into(),
        };
        let value = serde_json::to_value(&failed).expect("serialize");
        assert_eq!(value["error"], "request timed out: page");
        assert_eq!(value["url"], "https://example.com");
    }
}
