//! TWAP Price Feed
//!
//! The boundary the downstream price provider polls. One `TwapFeed` owns
//! one bootstrapped pool; `poll_price` runs throttle, oracle read,
//! conversion and encoding under a single async mutex, so concurrent
//! pollers of the same pool queue up instead of overlapping.
//!
//! Created: 2026-10-19

use crate::config::FeedConfig;
use crate::error::TwapError;
use crate::pool::{bootstrap, PoolReader, PoolTransport, RetryPolicy};
use crate::twap::codec;
use crate::twap::converter::PriceConverter;
use crate::twap::sampler::TwapSampler;
use crate::types::{DecimalScale, PoolIdentity, PriceSample};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Everything needed to bootstrap and run one feed
#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub node_url: String,
    pub pool_address: String,
    pub token_address: String,
    pub quote_decimals: u32,
    pub window_seconds: u32,
    pub min_update_interval: Duration,
    pub precision: u32,
    pub retry: RetryPolicy,
}

impl From<&FeedConfig> for FeedSettings {
    fn from(config: &FeedConfig) -> Self {
        Self {
            node_url: config.node.url.clone(),
            pool_address: config.pool.address.clone(),
            token_address: config.pool.token.clone(),
            quote_decimals: config.pool.quote_decimals,
            window_seconds: config.twap.window_seconds,
            min_update_interval: config.min_update_interval(),
            precision: config.twap.precision_bits,
            retry: config.retry_policy(),
        }
    }
}

struct FeedState<R> {
    sampler: TwapSampler<R>,
    last_sample: Option<PriceSample>,
    hung_up: bool,
}

pub struct TwapFeed<R> {
    identity: PoolIdentity,
    window_seconds: u32,
    scale: DecimalScale,
    converter: PriceConverter,
    state: Mutex<FeedState<R>>,
}

impl<R: PoolReader> TwapFeed<R> {
    /// Bootstrap the pool and build a feed over the returned handle.
    pub async fn connect<T>(settings: &FeedSettings, transport: &T) -> Result<Self, TwapError>
    where
        T: PoolTransport<Reader = R>,
    {
        if settings.window_seconds == 0 {
            return Err(TwapError::InvalidWindow { window_seconds: 0 });
        }

        let (identity, reader) = bootstrap(
            transport,
            &settings.node_url,
            &settings.pool_address,
            &settings.token_address,
            &settings.retry,
        )
        .await?;

        Ok(Self::from_parts(identity, reader, settings))
    }

    pub fn from_parts(identity: PoolIdentity, reader: R, settings: &FeedSettings) -> Self {
        let converter = PriceConverter::new(settings.precision);
        let sampler = TwapSampler::new(
            reader,
            identity.pool,
            settings.min_update_interval,
            converter.precision(),
        );
        info!(
            "TWAP feed ready: {} over {}s, {} quote decimals",
            identity, settings.window_seconds, settings.quote_decimals
        );

        Self {
            identity,
            window_seconds: settings.window_seconds,
            scale: DecimalScale::new(settings.quote_decimals),
            converter,
            state: Mutex::new(FeedState {
                sampler,
                last_sample: None,
                hung_up: false,
            }),
        }
    }

    pub fn identity(&self) -> &PoolIdentity {
        &self.identity
    }

    pub fn window_seconds(&self) -> u32 {
        self.window_seconds
    }

    /// Sample, convert and retain one price.
    pub async fn poll_sample(&self) -> Result<PriceSample, TwapError> {
        let mut state = self.state.lock().await;

        let mean_tick = state.sampler.sample(self.window_seconds).await?;
        let sample = self.converter.price_from_mean_tick(
            &mean_tick,
            self.identity.token_is_base,
            &self.scale,
        )?;

        debug!("{}: mean tick {} -> price {}", self.identity.pool, mean_tick, sample.price);
        state.last_sample = Some(sample.clone());
        Ok(sample)
    }

    /// Encoded latest price, or the error that prevented it.
    pub async fn poll_price(&self) -> Result<Vec<u8>, TwapError> {
        match self.poll_sample().await {
            Ok(sample) => Ok(codec::encode(&sample)),
            Err(e) => {
                warn!("Price poll failed for {}: {}", self.identity.pool, e);
                Err(e)
            }
        }
    }

    /// Most recent successfully computed sample
    pub async fn last_sample(&self) -> Option<PriceSample> {
        self.state.lock().await.last_sample.clone()
    }

    /// Release the pool handle. Later calls are no-ops.
    pub async fn hang_up(&self) {
        let mut state = self.state.lock().await;
        if state.hung_up {
            return;
        }
        state.sampler.hang_up();
        state.hung_up = true;
        info!("Hung up pool {}", self.identity.pool);
    }
}
