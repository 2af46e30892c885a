//! # Launch Radar
//!
//! Aggregates newly launched products from two very different sources into
//! one ranked list:
//!
//! - **Product Hunt**, through its GraphQL API (needs a developer token)
//! - **AppSumo**, by scraping its search and browse pages
//!
//! ## Usage
//!
//! ```sh
//! PRODUCTHUNT_API_KEY=... launch_radar -n 20 -t "developer tools"
//! ```
//!
//! ## Architecture
//!
//! 1. **Normalize**: the topic is rewritten into each source's syntax
//! 2. **Fetch**: both sources are queried concurrently for the full limit
//! 3. **Merge**: failures are dropped, records tagged, dated ones ordered
//!    newest first, the list cut to the limit
//! 4. **Output**: a JSON report or a Markdown table

use clap::Parser;
use std::error::Error;
use std::time::Duration as StdDuration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use launch_radar::cli::Cli;
use launch_radar::outputs;
use launch_radar::{
    AppSumoAdapter, Aggregator, Config, CrawlReport, HttpTransport, ProductHuntAdapter,
    RetryTransport,
};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env file loaded");
    }

    // Parse CLI
    let args = Cli::parse();
    debug!(limit = args.limit, topic = ?args.topic, source = ?args.source, "Parsed CLI arguments");

    let config = Config::from_cli(&args)?;
    info!(has_token = config.api_token.is_some(), "launch_radar starting up");

    // ---- Wire adapters ----
    let http = HttpTransport::new(&config)?;
    let retrying = || {
        RetryTransport::new(http.clone(), config.max_retries, StdDuration::from_millis(500))
    };
    let aggregator = Aggregator::new(
        ProductHuntAdapter::new(retrying(), &config),
        AppSumoAdapter::new(retrying(), &config),
    );

    // ---- Aggregate ----
    let products = match aggregator
        .aggregate_from(args.source.into(), args.limit, args.topic.as_deref())
        .await
    {
        Ok(products) => products,
        Err(e) => {
            error!(error = %e, "Aggregation rejected");
            return Err(e.into());
        }
    };

    // ---- Output ----
    let report = CrawlReport::new(args.topic.clone(), products);
    let rendered = outputs::render(&report, args.format)?;
    outputs::emit(&rendered, args.output.as_deref()).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        count = report.count,
        "Execution complete"
    );
    Ok(())
}
