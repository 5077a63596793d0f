// Core data structures for the TWAP source

use crate::error::TwapError;
use crate::math::{ArithmeticError, BigFloat};
use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, BigUint};
use std::fmt;

/// Pool/token identity, resolved once at bootstrap and never mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolIdentity {
    pub pool: Address,
    /// The token being priced
    pub token: Address,
    pub token0: Address,
    pub token1: Address,
    /// True when the tracked token is the pool's token0
    pub token_is_base: bool,
}

impl PoolIdentity {
    /// The pool's other side (the asset prices are quoted in)
    pub fn quote_token(&self) -> Address {
        if self.token_is_base {
            self.token1
        } else {
            self.token0
        }
    }
}

impl fmt::Display for PoolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pool {} token {} ({})",
            self.pool,
            self.token,
            if self.token_is_base { "token0" } else { "token1" }
        )
    }
}

/// Two cumulative-tick samples: `window_seconds` ago and now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub window_seconds: u32,
    pub window_start: BigInt,
    pub now: BigInt,
}

impl Observation {
    /// Time-weighted mean tick over the window, without integer truncation.
    pub fn mean_tick(&self, precision: u32) -> Result<MeanTick, TwapError> {
        if self.window_seconds == 0 {
            return Err(TwapError::InvalidWindow { window_seconds: 0 });
        }
        let delta = BigFloat::from(&self.now - &self.window_start);
        let mean = delta.div(&BigFloat::from(self.window_seconds), precision)?;
        Ok(MeanTick(mean))
    }
}

/// Time-weighted average tick (fractional, signed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeanTick(pub BigFloat);

impl MeanTick {
    pub fn from_f64(tick: f64) -> Result<Self, ArithmeticError> {
        BigFloat::from_f64(tick).map(MeanTick)
    }

    pub fn value(&self) -> &BigFloat {
        &self.0
    }
}

impl fmt::Display for MeanTick {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Quote-asset decimal places, materialized as `10^decimals`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalScale {
    decimals: u32,
    factor: BigFloat,
}

impl DecimalScale {
    pub fn new(decimals: u32) -> Self {
        Self {
            decimals,
            factor: BigFloat::from(BigInt::from(BigUint::from(10u32).pow(decimals))),
        }
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    pub fn factor(&self) -> &BigFloat {
        &self.factor
    }
}

/// Terminal output: price of the tracked token in quote units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSample {
    pub price: BigFloat,
    pub computed_at: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(price: BigFloat) -> Self {
        Self {
            price,
            computed_at: Utc::now(),
        }
    }

    /// Price times an external multiplier, narrowed to `f64`
    pub fn scaled(&self, multiplier: f64) -> Result<f64, ArithmeticError> {
        let multiplier = BigFloat::from_f64(multiplier)?;
        let precision = crate::math::DEFAULT_PRECISION;
        Ok(self.price.mul(&multiplier, precision).to_f64())
    }
}
