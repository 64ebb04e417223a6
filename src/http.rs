//! HTTP transport shared by every upstream client
//!
//! Wraps `reqwest` with the aggregator's request policy: a bounded timeout
//! per attempt, and a small number of retries with exponential backoff when
//! the upstream answers with a rate-limit or transient server error.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::config::HttpConfig;

/// Statuses worth retrying: rate limiting and transient upstream failures
const RETRYABLE_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Errors from a single logical request, after any retries
#[derive(Debug, Error)]
pub enum HttpError {
    /// Transport-level failure (connect, TLS, timeout). Not retried.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status outside the retry set
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// Every attempt came back with a retryable status
    #[error("{url} still failing with HTTP {status} after {attempts} attempts")]
    RetriesExhausted {
        url: String,
        status: StatusCode,
        attempts: u32,
    },

    /// Body was not the JSON shape the caller expected
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client applying the shared timeout and retry policy
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
    attempts: u32,
    backoff: Duration,
}

impl HttpClient {
    /// Creates a client from the aggregator's HTTP configuration
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
            attempts: config.retry_attempts.max(1),
            backoff: Duration::from_secs(config.retry_backoff_secs),
        }
    }

    /// Performs a GET with query parameters and decodes the JSON body as `T`
    ///
    /// Statuses in the retry set are retried with exponential backoff (the
    /// configured base doubles after each attempt) up to the configured
    /// attempt count. Any other error status, and all transport errors, fail
    /// immediately.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, HttpError> {
        let mut last_status = StatusCode::SERVICE_UNAVAILABLE;

        for attempt in 0..self.attempts {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(self.backoff, attempt)).await;
            }

            let mut request = self.client.get(url).timeout(self.timeout);
            if !params.is_empty() {
                request = request.query(params);
            }

            let response = request.send().await.map_err(|source| HttpError::Request {
                url: url.to_string(),
                source,
            })?;

            let status = response.status();
            if RETRYABLE_STATUS.contains(&status.as_u16()) {
                last_status = status;
                continue;
            }
            if !status.is_success() {
                return Err(HttpError::Status {
                    url: url.to_string(),
                    status,
                });
            }

            return response.json::<T>().await.map_err(|source| HttpError::Decode {
                url: url.to_string(),
                source,
            });
        }

        Err(HttpError::RetriesExhausted {
            url: url.to_string(),
            status: last_status,
            attempts: self.attempts,
        })
    }
}

/// Delay before retry number `attempt`: base, then doubling
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt.saturating_sub(1))
}
