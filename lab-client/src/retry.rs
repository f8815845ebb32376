//! JSON POST with retry and exponential backoff.
//!
//! Every failed attempt (transport error, non-2xx status, body that is not
//! JSON) is treated as transient. Before retry `n` the client sleeps
//! [`RetryConfig::delay_for_retry`]`(n)` and tries again until the retry
//! budget is spent.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::{GenerationError, GenerationResult};

/// Configuration for retry with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_backoff_ms: u64,
    /// Factor applied to the delay after every retry.
    pub multiplier: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff_ms: 1000,
            multiplier: 2,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(max_retries: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (0-indexed). Uncapped, no jitter.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> u64 {
        (0..retry).fold(self.initial_backoff_ms, |delay, _| {
            delay.saturating_mul(self.multiplier)
        })
    }

    /// Every delay the client will sleep through if all attempts fail.
    #[must_use]
    pub fn schedule(&self) -> Vec<u64> {
        (0..self.max_retries)
            .map(|retry| self.delay_for_retry(retry))
            .collect()
    }

    /// Total attempts including the first one.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// One failed attempt.
struct AttemptFailure {
    status: Option<u16>,
    error: GenerationError,
}

/// HTTP client that retries transient failures.
#[derive(Debug, Clone)]
pub struct RetryingClient {
    http: Client,
    retry: RetryConfig,
}

impl RetryingClient {
    /// Build a client with an optional per-attempt timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the HTTP client fails to build.
    pub fn new(retry: RetryConfig, request_timeout: Option<Duration>) -> GenerationResult<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            "design-lab/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(builder.build()?, retry))
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn with_http(http: Client, retry: RetryConfig) -> Self {
        Self { http, retry }
    }

    /// Active retry configuration.
    #[must_use]
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// POST `payload` as JSON and return the parsed JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::RequestFailed`] with the last status and
    /// failure message once `max_retries` retries have failed.
    pub async fn request(&self, url: &Url, payload: &Value) -> GenerationResult<Value> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let failure = match self.attempt(url, payload).await {
                Ok(body) => {
                    debug!(endpoint = url.path(), attempt, "Request succeeded");
                    return Ok(body);
                }
                Err(failure) => failure,
            };

            if attempt >= max_attempts {
                warn!(
                    endpoint = url.path(),
                    attempts = attempt,
                    "Request failed, retries exhausted: {}",
                    failure.error
                );
                return Err(GenerationError::RequestFailed {
                    status: failure.status,
                    message: failure.error.to_string(),
                    attempts: attempt,
                });
            }

            let backoff = self.retry.delay_for_retry(attempt - 1);
            warn!(
                "Request to {} failed (attempt {}/{}), retrying in {}ms: {}",
                url.path(),
                attempt,
                max_attempts,
                backoff,
                failure.error
            );
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }
    }

    async fn attempt(&self, url: &Url, payload: &Value) -> Result<Value, AttemptFailure> {
        let response = self
            .http
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| AttemptFailure {
                status: e.status().map(|s| s.as_u16()),
                error: GenerationError::Transient(e.without_url().to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure {
                status: Some(status.as_u16()),
                error: GenerationError::Transient(format!("HTTP {}", status.as_u16())),
            });
        }

        response.json::<Value>().await.map_err(|e| AttemptFailure {
            status: Some(status.as_u16()),
            error: GenerationError::Transient(format!(
                "invalid JSON body: {}",
                e.without_url()
            )),
        })
    }
}
