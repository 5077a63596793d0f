//! Bounded Retry with Exponential Backoff
//!
//! `RetryPolicy::run` drives any fallible async operation: up to
//! `max_attempts` tries, sleeping `base_delay * multiplier^(n-1)` after the
//! n-th failure. No sleep follows the final failure.
//!
//! Sleeps go through `tokio::time`, so paused-clock tests see exact delays.
//!
//! Created: 2026-10-19

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Default attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Delay after the first failure
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(4);

/// Delay growth per failure
pub const DEFAULT_MULTIPLIER: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// All attempts failed; carries the last cause
#[derive(Debug)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: anyhow::Error,
}

impl RetryPolicy {
    /// Backoff after the `attempt`-th failure (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, RetryExhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    warn!("{} failed on final attempt {}/{}: {:#}", label, attempt, max_attempts, e);
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {:#} (retrying in {:?})",
                        label, attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
