//! TWAP Sampler
//!
//! Reads two cumulative-tick observations (window start and now) in one
//! `observe` call and derives the mean tick. A last-call throttle caps how
//! often the oracle is hit regardless of how often callers poll: a sample
//! requested sooner than `min_interval` after the previous read completed
//! waits out the remainder first.
//!
//! The sampler owns its throttle state and takes `&mut self`; callers
//! sharing one pool serialize through `TwapFeed`.
//!
//! Created: 2026-10-19

use crate::error::TwapError;
use crate::pool::PoolReader;
use crate::types::{MeanTick, Observation};
use alloy::primitives::Address;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default minimum spacing between oracle reads
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

/// Last-call-timestamp rate limiter
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Wait until `min_interval` has passed since the last `mark`.
    pub async fn wait(&self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Throttling oracle read for {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Record that a read just completed
    pub fn mark(&mut self) {
        self.last = Some(Instant::now());
    }

    pub fn last(&self) -> Option<Instant> {
        self.last
    }
}

/// Mean-tick sampler over one pool handle
pub struct TwapSampler<R> {
    reader: R,
    pool: Address,
    throttle: Throttle,
    precision: u32,
}

impl<R: PoolReader> TwapSampler<R> {
    pub fn new(reader: R, pool: Address, min_interval: Duration, precision: u32) -> Self {
        Self {
            reader,
            pool,
            throttle: Throttle::new(min_interval),
            precision,
        }
    }

    /// Mean tick over the last `window_seconds`.
    ///
    /// Oracle failures are returned as-is; retrying is the caller's call.
    pub async fn sample(&mut self, window_seconds: u32) -> Result<MeanTick, TwapError> {
        if window_seconds == 0 {
            return Err(TwapError::InvalidWindow { window_seconds });
        }

        self.throttle.wait().await;
        let observed = self.observe(window_seconds).await;
        // stamp after the read completes
        self.throttle.mark();
        let observation = observed?;
        let mean_tick = observation.mean_tick(self.precision)?;
        debug!(
            "Pool {:?}: tickCumulatives [{}, {}] over {}s -> mean tick {}",
            self.pool, observation.window_start, observation.now, window_seconds, mean_tick
        );
        Ok(mean_tick)
    }

    /// Single oracle read, oldest offset first
    pub async fn observe(&self, window_seconds: u32) -> Result<Observation, TwapError> {
        let [window_start, now] = self
            .reader
            .observe([window_seconds, 0])
            .await
            .map_err(|source| TwapError::OracleReadFailed {
                pool: self.pool,
                source,
            })?;

        Ok(Observation {
            window_seconds,
            window_start,
            now,
        })
    }

    pub fn hang_up(&mut self) {
        self.reader.hang_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::BigFloat;
    use crate::pool::reader::mock::{MockPool, MockReader};
    use std::sync::atomic::Ordering;

    fn sampler(pool: &std::sync::Arc<MockPool>) -> TwapSampler<MockReader> {
        TwapSampler::new(
            MockReader::new(pool.clone()),
            Address::repeat_byte(0x01),
            DEFAULT_MIN_UPDATE_INTERVAL,
            256,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_requests_window_then_now() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [1_000, 7_000]);
        let mut sampler = sampler(&pool);

        let mean = sampler.sample(600).await.unwrap();

        assert_eq!(mean.0, BigFloat::from(10i64));
        assert_eq!(*pool.seconds_agos.lock().unwrap(), vec![[600, 0]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_mean_tick() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, -7]);
        let mut sampler = sampler(&pool);

        let mean = sampler.sample(2).await.unwrap();
        assert_eq!(mean.0, BigFloat::from_f64(-3.5).unwrap());
    }

    #[tokio::test]
    async fn test_zero_window_fails_without_oracle_read() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, 0]);
        let mut sampler = sampler(&pool);

        let err = sampler.sample(0).await.unwrap_err();
        assert!(matches!(err, TwapError::InvalidWindow { window_seconds: 0 }));
        assert_eq!(pool.observe_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_spaces_consecutive_reads() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, 60]);
        let mut sampler = sampler(&pool);

        sampler.sample(60).await.unwrap();
        let first_return = Instant::now();
        sampler.sample(60).await.unwrap();
        let second_return = Instant::now();

        assert_eq!(pool.observe_calls.load(Ordering::SeqCst), 2);
        assert!(second_return - first_return >= DEFAULT_MIN_UPDATE_INTERVAL);

        let times = pool.observe_times.lock().unwrap().clone();
        assert!(times[1] - times[0] >= DEFAULT_MIN_UPDATE_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_read_still_spaces_returns() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, 60]);
        *pool.first_observe_delay.lock().unwrap() = Some(Duration::from_millis(800));
        let mut sampler = sampler(&pool);

        sampler.sample(60).await.unwrap();
        let first_return = Instant::now();
        sampler.sample(60).await.unwrap();
        let second_return = Instant::now();

        let gap = second_return - first_return;
        assert!(gap >= DEFAULT_MIN_UPDATE_INTERVAL, "returns only {gap:?} apart");

        let times = pool.observe_times.lock().unwrap().clone();
        assert!(times[1] - times[0] >= DEFAULT_MIN_UPDATE_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_does_not_delay_spaced_calls() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        throttle.wait().await;
        throttle.mark();
        tokio::time::advance(Duration::from_secs(5)).await;

        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_read_is_throttled_too() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, 0]);
        pool.fail_observe.store(true, Ordering::SeqCst);
        let mut sampler = sampler(&pool);

        sampler.sample(30).await.unwrap_err();
        sampler.sample(30).await.unwrap_err();

        let times = pool.observe_times.lock().unwrap().clone();
        assert!(times[1] - times[0] >= DEFAULT_MIN_UPDATE_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oracle_failure_surfaces() {
        let pool = MockPool::new(Address::ZERO, Address::ZERO, [0, 0]);
        pool.fail_observe.store(true, Ordering::SeqCst);
        let mut sampler = sampler(&pool);

        let err = sampler.sample(30).await.unwrap_err();
        match err {
            TwapError::OracleReadFailed { source, .. } => assert_eq!(source.to_string(), "OLD"),
            other => panic!("expected OracleReadFailed, got {other:?}"),
        }
        // no internal retry
        assert_eq!(pool.observe_calls.load(Ordering::SeqCst), 1);
    }
}
