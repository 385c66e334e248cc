//! Retry with capped exponential backoff.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};
use twintone_core::config::GenerationConfig;

use crate::error::GenerationError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            backoff_multiplier: 2.0,
        }
    }

    pub fn should_retry(&self, attempt: u32, error: &GenerationError) -> bool {
        error.retryable && attempt < self.max_attempts
    }

    /// Delay after the given (1-based) failed attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let unbounded = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

/// Run `execute` until it succeeds, fails permanently, or the attempt
/// budget is spent. `sleep` is injected so callers (and tests) control how
/// the backoff is awaited.
pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, GenerationError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, GenerationError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        debug!(operation, attempt, "Generation attempt started");

        match execute(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if policy.should_retry(attempt, &error) {
                    let delay = policy.backoff_for_attempt(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Generation attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                warn!(operation, attempts = attempt, error = %error, "Generation failed");
                return Err(error);
            }
        }
    }
}
