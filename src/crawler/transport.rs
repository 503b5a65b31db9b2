//! HTTP transport with retry and backoff
//!
//! This module wraps a single pooled reqwest client and applies the retry
//! policy shared by every request in a crawl:
//! - retryable statuses and connection-level failures are retried with
//!   exponential backoff
//! - any other non-success status is rejected immediately
//! - the client (and its connection pool) is reused across all tasks

use crate::config::TransportConfig;
use crate::TransportError;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,

    /// Response body
    pub body: String,
}

/// Builds the HTTP client used by a crawl
///
/// # Arguments
///
/// * `config` - The transport configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .danger_accept_invalid_certs(!config.verify_tls)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Shared HTTP transport
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    retries: u32,
    backoff_base: Duration,
    retry_statuses: HashSet<u16>,
}

impl Transport {
    /// Creates a transport from configuration
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            retries: config.retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            retry_statuses: config.retry_statuses.iter().copied().collect(),
        })
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Status in retry set | Retry, then `Exhausted` |
    /// | Other non-success status | Immediate `Rejected` |
    /// | Connect / timeout / send / body error | Retry, then `Exhausted` |
    /// | Any other request error (bad URL, builder) | Immediate `Exhausted` |
    ///
    /// Attempt `n` (0-based) that fails retryably waits `backoff_base * 2^n`
    /// before the next attempt.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError> {
        let attempts = self.retries + 1;
        let mut last_failure = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt - 1);
                tracing::debug!(
                    "Retrying {} in {:?} (attempt {}/{}): {}",
                    url,
                    delay,
                    attempt + 1,
                    attempts,
                    last_failure
                );
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                return Ok(FetchedPage {
                                    status: status.as_u16(),
                                    body,
                                })
                            }
                            Err(e) => {
                                last_failure = format!("body read failed: {}", e);
                                continue;
                            }
                        }
                    }

                    if self.is_retryable(status) {
                        last_failure = format!("HTTP {}", status.as_u16());
                        continue;
                    }

                    return Err(TransportError::Rejected {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Err(e) => {
                    last_failure = classify_request_error(&e);
                    if !is_transient(&e) {
                        return Err(TransportError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt + 1,
                            reason: last_failure,
                        });
                    }
                }
            }
        }

        Err(TransportError::Exhausted {
            url: url.to_string(),
            attempts,
            reason: last_failure,
        })
    }

    /// Returns true if the status is in the configured retry set
    pub fn is_retryable(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Delay before the retry that follows failed attempt `attempt`
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Connection-level failures that another attempt may get past
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_request()
}

fn classify_request_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}
