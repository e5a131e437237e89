//! Retry with capped exponential backoff for Admin API calls.
//!
//! Each call to [`RetryPolicy::run`] owns its own attempt counter; nothing is
//! shared between concurrent requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::ShopifyAdminConfig;

use super::ShopifyError;

/// Outcome of a single failed attempt, as classified by the caller.
#[derive(Debug)]
pub enum AttemptError {
    /// HTTP 429 or a `THROTTLED` GraphQL error. Carries the server's
    /// `Retry-After` hint when one was sent.
    Throttled(Option<Duration>),
    /// Worth another attempt (transport error, 5xx, unexpected status).
    Retryable(ShopifyError),
    /// Retrying cannot help (bad credentials, invalid query, unparseable body).
    Fatal(ShopifyError),
}

/// Retry behavior for upstream requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Ceiling for any single delay, including server-supplied ones.
    pub max_backoff: Duration,
    /// Add up to 25% random jitter (never past `max_backoff`).
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl From<&ShopifyAdminConfig> for RetryPolicy {
    fn from(config: &ShopifyAdminConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.backoff_initial,
            max_backoff: config.backoff_max,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Backoff after failed attempt number `attempt` (1-based):
    /// `initial * 2^(attempt - 1)`, capped at `max_backoff`.
    #[must_use]
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1).min(30)).unwrap_or(30);
        let base = self.initial_backoff.as_secs_f64() * 2f64.powi(exponent);
        let cap = self.max_backoff.as_secs_f64();
        let capped = base.min(cap);

        let with_jitter = if self.jitter {
            (capped * (1.0 + rand::random::<f64>() * 0.25)).min(cap)
        } else {
            capped
        };

        Duration::from_secs_f64(with_jitter)
    }

    /// Delay to wait after a failed attempt.
    fn delay_for(&self, attempt: u32, error: &AttemptError) -> Duration {
        match error {
            AttemptError::Throttled(Some(retry_after)) => (*retry_after).min(self.max_backoff),
            _ => self.backoff_duration(attempt),
        }
    }

    /// Run `operation` until it succeeds, fails fatally, or attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the fatal error as-is. On exhaustion returns
    /// `ShopifyError::RateLimited` if the last attempt was throttled, otherwise
    /// `ShopifyError::RetriesExhausted` describing the last failure.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T, ShopifyError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = operation_name, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(AttemptError::Fatal(e)) => {
                    debug!(
                        operation = operation_name,
                        attempt,
                        error = %e,
                        "Non-retryable failure"
                    );
                    return Err(e);
                }
                Err(e) => e,
            };

            if attempt >= max_attempts {
                warn!(
                    operation = operation_name,
                    attempts = attempt,
                    "Giving up after final attempt"
                );
                return Err(match error {
                    AttemptError::Throttled(_) => ShopifyError::RateLimited { attempts: attempt },
                    AttemptError::Retryable(e) | AttemptError::Fatal(e) => {
                        ShopifyError::RetriesExhausted {
                            attempts: attempt,
                            reason: e.to_string(),
                        }
                    }
                });
            }

            let backoff = self.delay_for(attempt, &error);
            match &error {
                AttemptError::Throttled(hint) => warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    retry_after = ?hint,
                    backoff_secs = backoff.as_secs_f64(),
                    "Rate limited, backing off"
                ),
                AttemptError::Retryable(e) | AttemptError::Fatal(e) => warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    error = %e,
                    "Attempt failed, retrying"
                ),
            }

            sleep(backoff).await;
            attempt += 1;
        }
    }
}
