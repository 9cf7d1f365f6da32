//! Retry with exponential backoff for rate-limited failures.
//!
//! Only errors whose [`RateLimitSignal`] reports rate limiting are
//! retried; everything else fails fast. The delay before attempt `n + 1`
//! is `base_delay * 2^n` plus up to one second of uniform jitter, with no
//! upper ceiling.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Upper bound of the additive jitter applied to every backoff wait.
const JITTER_MS: u64 = 1000;

/// Tags an error type with a rate-limit predicate.
///
/// Keeps the retry loop decoupled from any transport's error hierarchy:
/// an error is retried if and only if this returns true.
pub trait RateLimitSignal {
    fn is_rate_limited(&self) -> bool;
}

/// Retry policy: bounded attempts with exponential backoff and jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total tries = max_retries + 1)
    pub max_retries: u32,

    /// Backoff base; attempt `n` waits `base_delay * 2^n` plus jitter
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit retry budget and backoff base.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Run `operation`, retrying rate-limited failures with backoff.
    ///
    /// The final rate-limited failure, and any non-rate-limited failure,
    /// propagate to the caller unchanged.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RateLimitSignal + Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_rate_limited() && attempt < self.max_retries => {
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "rate limited, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Delay before the attempt after `attempt`: `base * 2^attempt` plus
    /// uniform jitter in `0..JITTER_MS`. No ceiling; saturates instead of
    /// overflowing at extreme attempt counts.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(2u64.saturating_pow(attempt));
        let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
        Duration::from_millis(exponential.saturating_add(jitter))
    }
}
