//! Uniswap V3 TWAP Price Source
//!
//! Resolves a tracked token inside a Uniswap V3 pool, samples the pool's
//! cumulative-tick oracle over a fixed window, converts the mean tick to
//! a price with arbitrary-precision arithmetic and encodes it for a
//! downstream price provider.
//!
//! Created: 2026-10-19

pub mod config;
pub mod contracts;
pub mod error;
pub mod math;
pub mod pool;
pub mod twap;
pub mod types;

// Re-export commonly used types
pub use config::FeedConfig;
pub use error::TwapError;
pub use math::{ArithmeticError, BigFloat};
pub use pool::{bootstrap, PoolReader, PoolTransport, RetryPolicy, RpcTransport};
pub use twap::{CodecError, FeedSettings, PriceConverter, TwapFeed, TwapSampler};
pub use types::{DecimalScale, MeanTick, Observation, PoolIdentity, PriceSample};
