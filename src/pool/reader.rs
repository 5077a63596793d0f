//! Pool Transport and Oracle Reads
//!
//! `PoolTransport` opens a handle to one pool; `PoolReader` is the handle:
//! token identity, the cumulative-tick oracle, and `hang_up`.
//!
//! `RpcTransport` is the alloy implementation. `connect()` picks http, ws
//! or ipc from the URL scheme; an `eth_blockNumber` probe confirms the node
//! answers before the handle is returned (http connects lazily).
//!
//! Created: 2026-10-19

use crate::contracts::UniswapV3Pool;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use num_bigint::BigInt;
use std::str::FromStr;
use tracing::debug;

/// Read access to a single pool
#[async_trait]
pub trait PoolReader: Send + Sync {
    /// The pool's (token0, token1)
    async fn tokens(&self) -> Result<(Address, Address)>;

    /// Cumulative ticks at each of the two `seconds_agos` offsets, same order
    async fn observe(&self, seconds_agos: [u32; 2]) -> Result<[BigInt; 2]>;

    /// Release the underlying connection. Safe to call repeatedly.
    fn hang_up(&mut self);
}

/// Opens pool handles against a node
#[async_trait]
pub trait PoolTransport: Send + Sync {
    type Reader: PoolReader + 'static;

    async fn open(&self, node_url: &str, pool: Address) -> Result<Self::Reader>;
}

/// alloy-backed transport
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcTransport;

#[async_trait]
impl PoolTransport for RpcTransport {
    type Reader = RpcPoolReader;

    async fn open(&self, node_url: &str, pool: Address) -> Result<RpcPoolReader> {
        let provider = ProviderBuilder::new()
            .connect(node_url)
            .await
            .context("Failed to connect to node")?
            .erased();

        let block = provider
            .get_block_number()
            .await
            .context("Node did not answer eth_blockNumber")?;
        debug!("Node reachable at block {}, pool {:?}", block, pool);

        Ok(RpcPoolReader {
            pool,
            contract: Some(UniswapV3Pool::new(pool, provider)),
        })
    }
}

/// Handle to one Uniswap V3 pool over an alloy provider
pub struct RpcPoolReader {
    pool: Address,
    contract: Option<UniswapV3Pool::UniswapV3PoolInstance<DynProvider>>,
}

impl RpcPoolReader {
    fn contract(&self) -> Result<&UniswapV3Pool::UniswapV3PoolInstance<DynProvider>> {
        self.contract
            .as_ref()
            .with_context(|| format!("Pool handle {:?} already hung up", self.pool))
    }
}

#[async_trait]
impl PoolReader for RpcPoolReader {
    async fn tokens(&self) -> Result<(Address, Address)> {
        let contract = self.contract()?;
        let token0 = contract.token0().call().await.context("Failed to get token0")?;
        let token1 = contract.token1().call().await.context("Failed to get token1")?;
        Ok((token0, token1))
    }

    async fn observe(&self, seconds_agos: [u32; 2]) -> Result<[BigInt; 2]> {
        let observed = self
            .contract()?
            .observe(seconds_agos.to_vec())
            .call()
            .await
            .context("Failed to call observe")?;

        let ticks = observed.tickCumulatives;
        if ticks.len() != 2 {
            bail!("observe returned {} tick cumulatives, expected 2", ticks.len());
        }

        // int56 -> BigInt through the decimal form, no width assumptions
        let start = BigInt::from_str(&ticks[0].to_string())
            .context("Unparseable tick cumulative")?;
        let now = BigInt::from_str(&ticks[1].to_string())
            .context("Unparseable tick cumulative")?;
        Ok([start, now])
    }

    fn hang_up(&mut self) {
        if self.contract.take().is_some() {
            debug!("Released provider for pool {:?}", self.pool);
        }
    }
}
