//! HTTP transport with exponential backoff retry logic.
//!
//! Adapters never talk to `reqwest` directly; they go through the
//! [`Transport`] trait so tests can script responses and count calls.
//!
//! # Architecture
//!
//! - [`Transport`]: core trait, one request in, one response out
//! - [`HttpTransport`]: `reqwest`-backed implementation
//! - [`RetryTransport`]: decorator that retries transient failures
//!
//! # Retry Strategy
//!
//! - Transport errors, HTTP 429 and HTTP 5xx are retried
//! - Exponential backoff from `base_delay`, capped at 30 seconds
//! - Random jitter (0-250ms by default) added to each delay
//!
//! Request timeouts are owned by the `reqwest` client; a timed-out request
//! surfaces as [`FetchError::Transport`] like any other network failure.

use crate::config::{ApiToken, Config};
use crate::error::FetchError;
use rand::{Rng, rng};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// An outbound request, independent of the HTTP client used to send it.
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<ApiToken>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            bearer: None,
            body: None,
        }
    }

    pub fn post_json(url: Url, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url,
            bearer: None,
            body: Some(body),
        }
    }

    pub fn with_bearer(mut self, token: ApiToken) -> Self {
        self.bearer = Some(token);
        self
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`FetchError::Status`].
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Status {
                status: self.status,
                reason: canonical_reason(self.status).to_string(),
            })
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// The fetch capability consumed by the source adapters.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send `request` and return whatever the server answered.
    ///
    /// Non-success statuses are returned as responses, not errors; only
    /// network-level failures produce `Err`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        (**self).send(request).await
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip_all, fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let t0 = Instant::now();
        let mut builder = self.client.request(request.method, request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "HTTP request completed"
        );
        Ok(HttpResponse { status, body })
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Transport`].
///
/// The delay between retries follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
/// ```
pub struct RetryTransport<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter: StdDuration,
}

impl<T> RetryTransport<T>
where
    T: Transport,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter: StdDuration::from_millis(250),
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: StdDuration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let exp = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self.base_delay.saturating_mul(1 << exp).min(self.max_delay);
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            delay
        } else {
            delay + StdDuration::from_millis(rng().random_range(0..=jitter_ms))
        }
    }
}

impl<T> fmt::Debug for RetryTransport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryTransport")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Transport for RetryTransport<T>
where
    T: Transport,
{
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let outcome = self.inner.send(request.clone()).await;
            let failure = match &outcome {
                Ok(resp) if resp.status == 429 || resp.status >= 500 => {
                    Some(format!("HTTP {}", resp.status))
                }
                Err(e) if e.is_transient() => Some(e.to_string()),
                _ => None,
            };
            let Some(failure) = failure else {
                return outcome;
            };

            attempt += 1;
            if attempt > self.max_retries {
                error!(
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u128,
                    error = %failure,
                    "request exhausted retries"
                );
                return outcome;
            }

            let delay = self.backoff(attempt);
            warn!(
                attempt,
                max = self.max_retries,
                ?delay,
                error = %failure,
                "request attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubTransport;
    use super::*;

    fn retrying(stub: StubTransport, max_retries: usize) -> RetryTransport<StubTransport> {
        RetryTransport::new(stub, max_retries, StdDuration::from_millis(1))
            .with_max_jitter(StdDuration::ZERO)
    }

    fn request() -> HttpRequest {
        HttpRequest::get(Url::parse("https://appsumo.com/browse/").unwrap())
    }

    #[test]
    fn test_error_for_status() {
        assert!(HttpResponse::new(204, "").error_for_status().is_ok());
        match HttpResponse::new(404, "nope").error_for_status() {
            Err(FetchError::Status { status, reason }) => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_debug_redacts_bearer() {
        let req = request().with_bearer(ApiToken::new("super-secret-token"));
        let dbg = format!("{req:?}");
        assert!(!dbg.contains("super-secret-token"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let t = RetryTransport::new(StubTransport::new(), 10, StdDuration::from_secs(1))
            .with_max_jitter(StdDuration::ZERO);
        assert_eq!(t.backoff(1), StdDuration::from_secs(1));
        assert_eq!(t.backoff(2), StdDuration::from_secs(2));
        assert_eq!(t.backoff(3), StdDuration::from_secs(4));
        assert_eq!(t.backoff(9), StdDuration::from_secs(30));
    }

    #[tokio::test]
    async fn test_retries_transient_failures_then_succeeds() {
        let stub = StubTransport::new()
            .fail(FetchError::Transport("connection reset".into()))
            .respond(503, "busy")
            .respond(200, "ok");
        let t = retrying(stub, 3);

        let resp = t.send(request()).await.unwrap();
        assert_eq!(resp.body, "ok");
        assert_eq!(t.inner.calls(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let stub = StubTransport::new()
            .respond(502, "")
            .respond(502, "")
            .respond(200, "too late");
        let t = retrying(stub, 1);

        let resp = t.send(request()).await.unwrap();
        assert_eq!(resp.status, 502);
        assert_eq!(t.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let stub = StubTransport::new().respond(401, "unauthorized").respond(200, "");
        let t = retrying(stub, 5);

        let resp = t.send(request()).await.unwrap();
        assert_eq!(resp.status, 401);
        assert_eq!(t.inner.calls(), 1);
    }
}
