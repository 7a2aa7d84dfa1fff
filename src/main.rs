//! CLI binary for proweb.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Diagnostics go to stderr so stdout stays a single JSON document.
    // Users can override with RUST_LOG=debug to see everything.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("proweb=info,proweb_search=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match Cli::try_parse() {
        Ok(cli) => cli::execute(&cli).await?,
        Err(err) => match cli::argument_error(&err) {
            Some(outcome) => outcome?,
            None => err.exit(),
        },
    };

    println!("{}", outcome.json);
    Ok(ExitCode::from(outcome.status))
}
