//! Product listing aggregation across Product Hunt and AppSumo.
//!
//! The entry point is [`Aggregator::aggregate`]: given a limit and an
//! optional topic it queries both sources concurrently, drops whichever
//! fails, and returns one merged list of [`NormalizedRecord`]s.
//!
//! ```ignore
//! let config = Config::default();
//! let http = HttpTransport::new(&config)?;
//! let aggregator = Aggregator::new(
//!     ProductHuntAdapter::new(http.clone(), &config),
//!     AppSumoAdapter::new(http, &config),
//! );
//! let products = aggregator.aggregate(10, Some("marketing")).await?;
//! ```

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod sources;
pub mod topic;
pub mod transport;
pub mod utils;

pub use aggregator::{Aggregator, SourceSelection};
pub use config::Config;
pub use error::{AggregateError, FetchError, SourceUnavailable};
pub use models::{CrawlReport, NormalizedRecord, Popularity, Source};
pub use sources::SourceAdapter;
pub use sources::appsumo::AppSumoAdapter;
pub use sources::producthunt::ProductHuntAdapter;
pub use transport::{HttpTransport, RetryTransport, Transport};
