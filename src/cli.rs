//! Command-line interface definitions for Launch Radar.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Connection settings can also come from environment variables or a YAML
//! file passed with `--config`.

use crate::aggregator::SourceSelection;
use clap::{Parser, ValueEnum};

/// Command-line arguments for the Launch Radar application.
///
/// # Examples
///
/// ```sh
/// # Ten newest products across both sources
/// launch_radar
///
/// # Twenty marketing products, Markdown table written to a file
/// launch_radar -n 20 -t "Marketing" -f markdown -o ./out/marketing.md
///
/// # AppSumo only
/// launch_radar --source app-sumo -t "no code"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Maximum number of products to return
    #[arg(short = 'n', long, default_value_t = 10, allow_negative_numbers = true)]
    pub limit: i64,

    /// Topic or keyword to filter by (e.g. "artificial intelligence")
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Which sources to query
    #[arg(short, long, value_enum, default_value_t = SourceArg::All)]
    pub source: SourceArg,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Product Hunt developer token
    #[arg(long, env = "PRODUCTHUNT_API_KEY", hide_env_values = true)]
    pub producthunt_api_key: Option<String>,

    /// Override the Product Hunt GraphQL endpoint
    #[arg(long, env = "PRODUCTHUNT_GRAPHQL_URL")]
    pub graphql_endpoint: Option<String>,

    /// Override the AppSumo origin
    #[arg(long, env = "APPSUMO_BASE_URL")]
    pub storefront_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient upstream failures
    #[arg(long)]
    pub max_retries: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    All,
    ProductHunt,
    AppSumo,
}

impl From<SourceArg> for SourceSelection {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::All => SourceSelection::All,
            SourceArg::ProductHunt => SourceSelection::ProductHunt,
            SourceArg::AppSumo => SourceSelection::AppSumo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}
