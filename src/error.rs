//! Error types for source fetching and aggregation.
//!
//! Only [`AggregateError`] ever reaches the caller of
//! [`Aggregator::aggregate`](crate::aggregator::Aggregator::aggregate).
//! [`SourceUnavailable`] is produced by an adapter and absorbed by the
//! aggregator, which logs it and carries on with whatever the other source
//! returned. [`ConfigError`] only occurs at startup.

use crate::models::Source;
use thiserror::Error;

/// Why a single fetch against an upstream source failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure: DNS, connect, TLS, timeout, body read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The GraphQL endpoint answered 200 but reported errors.
    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    /// No API credential was configured for a source that requires one.
    #[error("no API credential configured")]
    MissingCredential,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest's Display includes the url; the bearer token never appears in it.
        FetchError::Transport(e.to_string())
    }
}

impl FetchError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// One source could not produce a result.
#[derive(Debug, Error)]
#[error("{origin} unavailable: {cause}")]
pub struct SourceUnavailable {
    pub origin: Source,
    #[source]
    pub cause: FetchError,
}

impl SourceUnavailable {
    pub fn new(origin: Source, cause: impl Into<FetchError>) -> Self {
        Self {
            origin,
            cause: cause.into(),
        }
    }
}

/// Configuration could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid url in configuration: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Caller-visible failure of an aggregation request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
