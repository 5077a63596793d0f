//! Error kinds surfaced by the TWAP source
//!
//! Every failure carries the pool/token/url it concerns plus the underlying
//! cause, so callers can log or re-poll without string matching.

use crate::math::ArithmeticError;
use crate::twap::codec::CodecError;
use alloy::primitives::Address;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwapError {
    /// Transport could not be opened within the retry budget
    #[error("connection to {url} failed after {attempts} attempts: {source:#}")]
    ConnectionFailed {
        url: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("token {token} is neither token0 ({token0}) nor token1 ({token1}) of pool {pool}")]
    TokenNotInPool {
        token: Address,
        pool: Address,
        token0: Address,
        token1: Address,
    },

    #[error("invalid TWAP averaging window: {window_seconds}s")]
    InvalidWindow { window_seconds: u32 },

    #[error("oracle read failed for pool {pool}: {source:#}")]
    OracleReadFailed {
        pool: Address,
        #[source]
        source: anyhow::Error,
    },

    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to load configuration from {}: {source:#}", path.display())]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl TwapError {
    /// Configuration and pool-membership errors never clear up by re-polling.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TwapError::ConnectionFailed { .. }
                | TwapError::TokenNotInPool { .. }
                | TwapError::InvalidWindow { .. }
                | TwapError::InvalidAddress { .. }
                | TwapError::InvalidConfig(_)
                | TwapError::ConfigLoad { .. }
        )
    }
}
