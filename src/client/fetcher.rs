//! HTTP fetcher implementation
//!
//! This module defines the fetch capability the pipeline depends on and its
//! reqwest-backed implementation, including:
//! - Building the HTTP client with compression and a request timeout
//! - Sending the rotated `User-Agent` with every request
//! - Classifying responses into content, throttling, or network failure

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Why a locator could not be read
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// The service asked us to slow down (HTTP 429)
    #[error("throttled by remote service")]
    Throttled,

    /// Connection refused, timeout, unreadable body, or non-success status
    #[error("network error: {0}")]
    Network(String),
}

/// Capability to read the content behind a locator
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        locator: &str,
        user_agent: &str,
    ) -> impl Future<Output = Result<String, FetchFailure>> + Send;
}

/// Fetches locators over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher whose requests give up after `timeout`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use prop_sieve::client::HttpFetcher;
    /// use std::time::Duration;
    ///
    /// let fetcher = HttpFetcher::new(Duration::from_secs(15)).unwrap();
    /// ```
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, locator: &str, user_agent: &str) -> Result<String, FetchFailure> {
        let response = self
            .client
            .get(locator)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "application/json, text/plain, */*")
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchFailure::Throttled);
        }
        if !status.is_success() {
            return Err(FetchFailure::Network(format!("HTTP {}", status.as_u16())));
        }

        response.text().await.map_err(classify_error)
    }
}

/// Classifies a transport error
fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Network("request timeout".to_string())
    } else if e.is_connect() {
        FetchFailure::Network("connection refused".to_string())
    } else {
        FetchFailure::Network(e.to_string())
    }
}
