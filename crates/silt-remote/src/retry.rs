//! Exponential backoff for remote calls.
//!
//! The policy is pure: it knows nothing about HTTP. Classification lives on
//! [`RemoteError::is_retryable`]; the server may shortcut the computed
//! delay with a `Retry-After` header, surfaced via
//! [`RemoteError::retry_after`].

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{RemoteError, RemoteResult};

/// Backoff policy for [`with_retry`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the second attempt; doubles each attempt after that.
    pub base_delay: Duration,
    /// Upper bound on any single computed delay.
    pub cap: Duration,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Fractional jitter applied to each delay (0.2 = plus or minus 20%).
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(250),
            cap: Duration::from_secs(10),
            max_attempts: 5,
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// The un-jittered delay after a failed attempt `n` (1-based):
    /// `min(cap, base * 2^(n-1))`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        exp.min(self.cap)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        delay.mul_f64(factor.max(0.0))
    }
}

/// Run `op` until it succeeds, fails terminally, or exhausts the policy.
///
/// The final attempt's error is returned to the caller as-is -- including a
/// retryable one whose budget ran out -- so the caller can decide what a
/// still-transient failure means for it.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> RemoteResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RemoteResult<T>>,
{
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = e
                    .retry_after()
                    .unwrap_or_else(|| policy.jittered(policy.delay_for_attempt(attempt)));
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "transient remote failure, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
