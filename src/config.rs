//! Feed Configuration
//!
//! Reads the TWAP feed settings from a TOML file. `.env` is loaded first
//! and `RPC_URL` overrides `[node] url`, so node credentials can stay out
//! of the config file.
//!
//! ```toml
//! [node]
//! url = "wss://..."
//!
//! [pool]
//! address = "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
//! token = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
//! quote_decimals = 12
//!
//! [twap]
//! window_seconds = 600
//! ```
//!
//! Created: 2026-10-19

use crate::error::TwapError;
use crate::pool::{normalize_address, RetryPolicy};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Top-level TOML configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub node: NodeConfig,
    pub pool: PoolConfig,
    pub twap: TwapConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// http(s), ws(s) or ipc endpoint
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub address: String,
    /// Token whose price is published
    pub token: String,
    /// Power of ten applied to the raw pool ratio
    #[serde(default)]
    pub quote_decimals: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwapConfig {
    pub window_seconds: u32,
    #[serde(default = "default_min_update_interval")]
    pub min_update_interval_ms: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_precision_bits")]
    pub precision_bits: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub multiplier: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_min_update_interval() -> u64 { 1000 }
fn default_multiplier() -> f64 { 1.0 }
fn default_poll_interval() -> u64 { 1000 }
fn default_precision_bits() -> u32 { crate::math::DEFAULT_PRECISION }
fn default_max_attempts() -> u32 { 5 }
fn default_base_delay() -> u64 { 4000 }
fn default_backoff_multiplier() -> u32 { 2 }

impl FeedConfig {
    /// Load `.env`, read and parse the file, apply `RPC_URL`, validate.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TwapError> {
        dotenv::dotenv().ok();
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))
            .map_err(|source| TwapError::ConfigLoad {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config: Self = toml::from_str(&content)
            .context("Failed to parse TOML configuration")
            .map_err(|source| TwapError::ConfigLoad {
                path: path.to_path_buf(),
                source,
            })?;

        config.apply_rpc_url(std::env::var("RPC_URL").ok());
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse and validate without touching the environment
    pub fn from_toml_str(content: &str) -> Result<Self, TwapError> {
        let config: Self =
            toml::from_str(content).map_err(|e| TwapError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// A non-empty `RPC_URL` replaces the file's node url
    pub fn apply_rpc_url(&mut self, rpc_url: Option<String>) {
        if let Some(url) = rpc_url.filter(|u| !u.trim().is_empty()) {
            self.node.url = url;
        }
    }

    pub fn validate(&self) -> Result<(), TwapError> {
        if self.node.url.trim().is_empty() {
            return Err(TwapError::InvalidConfig(
                "node url is empty (set [node] url or RPC_URL)".to_string(),
            ));
        }
        normalize_address(&self.pool.address)?;
        normalize_address(&self.pool.token)?;

        if self.twap.window_seconds == 0 {
            return Err(TwapError::InvalidWindow { window_seconds: 0 });
        }
        if !self.twap.multiplier.is_finite() {
            return Err(TwapError::InvalidConfig(format!(
                "multiplier {} is not finite",
                self.twap.multiplier
            )));
        }
        if self.twap.poll_interval_ms == 0 {
            return Err(TwapError::InvalidConfig("poll_interval_ms must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(TwapError::InvalidConfig("retry max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            multiplier: self.retry.multiplier,
        }
    }

    pub fn min_update_interval(&self) -> Duration {
        Duration::from_millis(self.twap.min_update_interval_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.twap.poll_interval_ms)
    }
}
