//! HTTP access for source connectors, with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: Core trait defining a single async GET
//! - [`ReqwestFetcher`]: `reqwest`-backed implementation
//! - [`RetryFetch`]: Decorator that adds retry logic to any `FetchAsync` implementation
//! - [`Http`]: What connectors hold; adds the fixed inter-request delay and JSON decoding
//!
//! # Retry Strategy
//!
//! - Only transient failures are retried (connect/timeout, 429, 5xx)
//! - Exponential backoff starting at 1 second, capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::config::ConnectorConfig;
use crate::error::ConnectorError;
use crate::utils::truncate_for_log;
use rand::{rng, Rng};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// A GET request: target URL plus extra headers.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl Request {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Trait for a single async fetch returning the response body.
pub trait FetchAsync {
    async fn fetch(&self, request: &Request) -> Result<String, ConnectorError>;
}

/// Plain `reqwest` client. Non-2xx responses become [`ConnectorError::Status`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: StdDuration) -> Result<Self, ConnectorError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for ReqwestFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &Request) -> Result<String, ConnectorError> {
        let mut builder = self.client.get(request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        // reqwest errors print the full URL, query credentials included.
        let response = builder.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::Status {
                status: status.as_u16(),
                url: redact(&request.url),
            });
        }
        Ok(response.text().await.map_err(|e| e.without_url())?)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchAsync`] implementation.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    async fn fetch(&self, request: &Request) -> Result<String, ConnectorError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(request).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let shift = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(16);
                    let mut delay = self.base_delay.saturating_mul(1 << shift);
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The HTTP handle connectors share: retrying fetcher plus a fixed pause
/// after every call.
#[derive(Debug)]
pub struct Http<F = ReqwestFetcher> {
    fetcher: RetryFetch<F>,
    request_delay: StdDuration,
}

impl Http<ReqwestFetcher> {
    pub fn from_config(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let fetcher = ReqwestFetcher::new(
            &config.user_agent,
            StdDuration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_fetcher(
            fetcher,
            config.max_retries,
            StdDuration::from_secs(1),
            StdDuration::from_millis(config.request_delay_ms),
        ))
    }
}

impl<F: FetchAsync> Http<F> {
    pub fn with_fetcher(
        fetcher: F,
        max_retries: usize,
        base_delay: StdDuration,
        request_delay: StdDuration,
    ) -> Self {
        Self {
            fetcher: RetryFetch::new(fetcher, max_retries, base_delay),
            request_delay,
        }
    }

    pub async fn get_text(&self, request: &Request) -> Result<String, ConnectorError> {
        let t0 = Instant::now();
        let res = self.fetcher.fetch(request).await;
        debug!(
            url = %redact(&request.url),
            elapsed_ms = t0.elapsed().as_millis(),
            ok = res.is_ok(),
            "GET"
        );
        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }
        res
    }

    pub async fn get_json<T: DeserializeOwned>(&self, request: &Request) -> Result<T, ConnectorError> {
        let body = self.get_text(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                url = %redact(&request.url),
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Response did not match expected JSON shape"
            );
            ConnectorError::Decode(e)
        })
    }
}

/// Strip query parameters that carry credentials before a URL hits the logs.
pub fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let pairs = url
        .query_pairs()
        .map(|(k, v)| {
            let secret = matches!(k.as_ref(), "apiKey" | "api_key" | "key" | "token");
            (k.into_owned(), if secret { "***".to_string() } else { v.into_owned() })
        })
        .collect::<Vec<_>>();
    if pairs.is_empty() {
        return clean.to_string();
    }
    clean.query_pairs_mut().clear().extend_pairs(pairs);
    clean.to_string()
}
