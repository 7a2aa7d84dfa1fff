//! Command-line surface: argument parsing and output documents.

use std::num::NonZeroUsize;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;

use proweb_search::{ExtractMode, SearchConfig, SearchRequest, Source};

/// Exit status when neither a query nor a URL was given.
const EXIT_USAGE: u8 = 2;

/// Exit status when the search or extraction itself failed.
const EXIT_FAILURE: u8 = 1;

/// proweb: aggregate web search results from multiple sources.
#[derive(Debug, Parser)]
#[command(name = "proweb", version, about)]
pub struct Cli {
    /// Search query.
    pub query: Option<String>,

    /// Number of results to return.
    #[arg(short = 'n', long, default_value = "10")]
    pub count: NonZeroUsize,

    /// Comma-separated sources: ddg, bing, google, wikipedia, arxiv.
    #[arg(short, long, default_value = "ddg,bing")]
    pub sources: String,

    /// Query all five sources.
    #[arg(long)]
    pub deep: bool,

    /// Extract page content for the top results.
    #[arg(long)]
    pub scrape_all: bool,

    /// Extract a single page instead of searching.
    #[arg(long, value_name = "URL")]
    pub scrape_url: Option<String>,

    /// What to extract: smart, text, links, images, metadata, all.
    #[arg(short, long, default_value = "smart")]
    pub extract: ExtractMode,

    /// Per-source timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

/// What one invocation resolved to.
#[derive(Debug)]
pub enum Action {
    Search(SearchRequest),
    Scrape { url: String, mode: ExtractMode },
    Usage,
}

/// Rendered stdout document plus the process exit status.
#[derive(Debug)]
pub struct Outcome {
    pub json: String,
    pub status: u8,
}

#[derive(Serialize)]
struct ErrorDocument<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

impl Cli {
    /// Sources to query, in order: all five with `--deep`, else `--sources`.
    pub fn selected_sources(&self) -> Vec<Source> {
        if self.deep {
            Source::all().to_vec()
        } else {
            Source::parse_list(&self.sources)
        }
    }

    /// Library configuration with command-line overrides applied.
    pub fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        if let Some(secs) = self.timeout {
            config.source_timeout_seconds = secs;
        }
        config
    }

    /// Decide what to do. `--scrape-url` wins over a query.
    pub fn action(&self) -> Action {
        if let Some(url) = self.scrape_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return Action::Scrape {
                url: url.to_owned(),
                mode: self.extract,
            };
        }

        let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) else {
            return Action::Usage;
        };
        // Construct directly: the query is non-blank and the count non-zero.
        let mut request = SearchRequest {
            query: query.to_owned(),
            sources: self.selected_sources(),
            count: self.count.get(),
            scrape: None,
        };
        if self.scrape_all {
            request = request.with_scrape(self.extract);
        }
        Action::Search(request)
    }
}

/// Run the invocation and render its stdout document.
///
/// Library failures become an `error` document with a non-zero status;
/// only output serialisation failures are returned as errors.
pub async fn execute(cli: &Cli) -> anyhow::Result<Outcome> {
    run(cli, &cli.search_config()).await
}

async fn run(cli: &Cli, config: &SearchConfig) -> anyhow::Result<Outcome> {
    match cli.action() {
        Action::Usage => error_outcome(
            "provide a search query or --scrape-url <URL>",
            None,
            EXIT_USAGE,
        ),
        Action::Scrape { url, mode } => {
            tracing::info!(%url, %mode, "extracting page");
            match proweb_search::fetch_page_content(&url, mode, config).await {
                Ok(page) => success_outcome(&page),
                Err(err) => error_outcome(&err.to_string(), Some(&url), EXIT_FAILURE),
            }
        }
        Action::Search(request) => {
            let ids: Vec<&str> = request.sources.iter().map(Source::id).collect();
            tracing::info!(sources = %ids.join(","), count = request.count, "searching");
            match proweb_search::search(&request, config).await {
                Ok(report) => success_outcome(&report),
                Err(err) => error_outcome(&err.to_string(), None, EXIT_FAILURE),
            }
        }
    }
}

/// Render a command-line parse failure as a usage error document.
///
/// Returns `None` for `--help` and `--version`, which clap prints itself.
pub fn argument_error(err: &clap::Error) -> Option<anyhow::Result<Outcome>> {
    use clap::error::ErrorKind;

    if matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    ) {
        return None;
    }
    let rendered = err.render().to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .trim();
    Some(error_outcome(message, None, EXIT_USAGE))
}

fn success_outcome<T: Serialize>(document: &T) -> anyhow::Result<Outcome> {
    let json = serde_json::to_string_pretty(document).context("failed to serialise output")?;
    Ok(Outcome { json, status: 0 })
}

fn error_outcome(error: &str, url: Option<&str>, status: u8) -> anyhow::Result<Outcome> {
    let json = serde_json::to_string_pretty(&ErrorDocument { error, url })
        .context("failed to serialise error document")?;
    Ok(Outcome { json, status })
}
