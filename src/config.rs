//! Runtime configuration.
//!
//! A [`Config`] is built once in `main` and handed to the adapters at
//! construction, so nothing below `main` reads the environment. Values are
//! layered: built-in defaults, then an optional YAML file (`--config`), then
//! CLI flags and environment variables.

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.producthunt.com/v2/api/graphql";
pub const DEFAULT_PRODUCTHUNT_SITE: &str = "https://www.producthunt.com";
pub const DEFAULT_STOREFRONT_URL: &str = "https://appsumo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_RETRIES: usize = 2;
pub const DEFAULT_USER_AGENT: &str = concat!("launch_radar/", env!("CARGO_PKG_VERSION"));

/// A bearer credential. Never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Product Hunt GraphQL endpoint.
    pub graphql_endpoint: Url,
    /// Origin used to resolve Product Hunt relative links.
    pub producthunt_site: Url,
    /// AppSumo origin; search and browse pages hang off it.
    pub storefront_url: Url,
    pub api_token: Option<ApiToken>,
    pub request_timeout: Duration,
    pub max_retries: usize,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            graphql_endpoint: Url::parse(DEFAULT_GRAPHQL_ENDPOINT).expect("static url"),
            producthunt_site: Url::parse(DEFAULT_PRODUCTHUNT_SITE).expect("static url"),
            storefront_url: Url::parse(DEFAULT_STOREFRONT_URL).expect("static url"),
            api_token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// The subset of [`Config`] that may live in a YAML file.
///
/// The API token is deliberately absent; it comes from the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub graphql_endpoint: Option<String>,
    pub storefront_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<usize>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: FileConfig = serde_yaml::from_str(&raw)?;
        info!("Loaded configuration file");
        Ok(parsed)
    }
}

impl Config {
    /// Apply the file layer on top of `self`.
    pub fn merge_file(mut self, file: FileConfig) -> Result<Self, ConfigError> {
        if let Some(endpoint) = file.graphql_endpoint {
            self.graphql_endpoint = Url::parse(&endpoint)?;
        }
        if let Some(storefront) = file.storefront_url {
            self.storefront_url = Url::parse(&storefront)?;
        }
        if let Some(secs) = file.timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = file.max_retries {
            self.max_retries = retries;
        }
        if let Some(agent) = file.user_agent {
            self.user_agent = agent;
        }
        Ok(self)
    }

    /// Build the effective configuration from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(path) = &cli.config {
            config = config.merge_file(FileConfig::load(Path::new(path))?)?;
        }

        if let Some(endpoint) = &cli.graphql_endpoint {
            config.graphql_endpoint = Url::parse(endpoint)?;
        }
        if let Some(storefront) = &cli.storefront_url {
            config.storefront_url = Url::parse(storefront)?;
        }
        if let Some(secs) = cli.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = cli.max_retries {
            config.max_retries = retries;
        }
        config.api_token = cli
            .producthunt_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(ApiToken::new);

        debug!(
            graphql_endpoint = %config.graphql_endpoint,
            storefront_url = %config.storefront_url,
            has_token = config.api_token.is_some(),
            timeout = ?config.request_timeout,
            max_retries = config.max_retries,
            "Resolved configuration"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_token_is_redacted() {
        let token = ApiToken::new("ph_live_abc123");
        assert_eq!(format!("{token:?}"), "ApiToken(<redacted>)");
        assert_eq!(token.to_string(), "<redacted>");
        assert_eq!(token.expose(), "ph_live_abc123");

        let config = Config {
            api_token: Some(token),
            ..Config::default()
        };
        assert!(!format!("{config:?}").contains("ph_live_abc123"));
    }

    #[test]
    fn test_file_layer_overrides_defaults() {
        let file: FileConfig = serde_yaml::from_str(
            "storefront_url: http://localhost:8080\ntimeout_secs: 3\nmax_retries: 0\n",
        )
        .unwrap();
        let config = Config::default().merge_file(file).unwrap();
        assert_eq!(config.storefront_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.graphql_endpoint.as_str(), DEFAULT_GRAPHQL_ENDPOINT);
    }

    #[test]
    fn test_file_rejects_unknown_keys() {
        let parsed: Result<FileConfig, _> = serde_yaml::from_str("api_token: nope\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_from_cli_ignores_blank_token() {
        let cli = Cli::parse_from(["launch_radar", "--producthunt-api-key", "   "]);
        let config = Config::from_cli(&cli).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_from_cli_applies_overrides() {
        let cli = Cli::parse_from([
            "launch_radar",
            "--producthunt-api-key",
            "tok",
            "--graphql-endpoint",
            "http://127.0.0.1:9000/graphql",
            "--timeout-secs",
            "5",
        ]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.api_token.as_ref().map(ApiToken::expose), Some("tok"));
        assert_eq!(config.graphql_endpoint.as_str(), "http://127.0.0.1:9000/graphql");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_from_cli_rejects_bad_url() {
        let cli = Cli::parse_from(["launch_radar", "--storefront-url", "not a url"]);
        assert!(matches!(Config::from_cli(&cli), Err(ConfigError::InvalidUrl(_))));
    }
}
