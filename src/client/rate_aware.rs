//! Rate-aware wrapper around a fetch capability
//!
//! Every visit sleeps for a randomized politeness delay, sends a rotated user
//! agent, and is bounded by a request timeout. A throttling signal pauses only
//! the calling task for the cooldown before the failure is reported. Retrying
//! is left to the caller.

use crate::client::fetcher::{Fetch, FetchFailure};
use crate::client::pacing::Pacing;
use crate::config::PipelineConfig;
use std::sync::Arc;
use std::time::Duration;

/// Called with the locator that triggered a throttling signal
pub type ThrottleHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Called with the locator and failure of a failed visit (throttling excluded)
pub type ErrorHook = Arc<dyn Fn(&str, &FetchFailure) + Send + Sync>;

/// Performs polite, bounded visits of locators
pub struct RateAwareClient<F: Fetch> {
    fetcher: F,
    pacing: Pacing,
    cooldown: Duration,
    request_timeout: Duration,
    on_throttled: ThrottleHook,
    on_error: ErrorHook,
}

impl<F: Fetch> RateAwareClient<F> {
    /// Creates a client with pacing, cooldown and timeout taken from `config`
    pub fn new(fetcher: F, config: &PipelineConfig) -> Self {
        Self {
            fetcher,
            pacing: Pacing::new(
                config.seed,
                config.min_delay,
                config.max_delay,
                config.user_agents.clone(),
            ),
            cooldown: config.cooldown,
            request_timeout: config.request_timeout,
            on_throttled: Arc::new(|locator| {
                tracing::warn!("Throttled while fetching {}, cooling down", locator);
            }),
            on_error: Arc::new(|locator, failure| {
                tracing::warn!("Failed to fetch {}: {}", locator, failure);
            }),
        }
    }

    /// Replaces the throttling hook
    pub fn on_throttled(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_throttled = Arc::new(hook);
        self
    }

    /// Replaces the failure hook
    pub fn on_error(mut self, hook: impl Fn(&str, &FetchFailure) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(hook);
        self
    }

    /// Visits one locator
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The content behind the locator
    /// * `Err(FetchFailure::Throttled)` - Reported after the cooldown has elapsed
    /// * `Err(FetchFailure::Network)` - Transport failure, HTTP error, or timeout
    pub async fn visit(&self, locator: &str) -> Result<String, FetchFailure> {
        let draw = self.pacing.draw();
        tracing::trace!(
            "Visiting {} after {:?} as {}",
            locator,
            draw.delay,
            draw.user_agent
        );
        tokio::time::sleep(draw.delay).await;

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.fetcher.fetch(locator, &draw.user_agent),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::Network(format!(
                "request timed out after {:?}",
                self.request_timeout
            ))),
        };

        match result {
            Ok(content) => Ok(content),
            Err(FetchFailure::Throttled) => {
                (self.on_throttled)(locator);
                tokio::time::sleep(self.cooldown).await;
                Err(FetchFailure::Throttled)
            }
            Err(failure) => {
                (self.on_error)(locator, &failure);
                Err(failure)
            }
        }
    }
}
