//! Mean Tick to Price Conversion
//!
//! Reproduces the pool's pricing convention at a (fractional) mean tick:
//!
//! ```text
//! sqrtRatio = sqrt(1.0001^tick) * 2^96
//! ratio     = sqrtRatio^2                      (scaled by 2^192)
//! price     = ratio / 2^192   if token is token0
//!           = 2^192 / ratio   if token is token1
//! price     = price * 10^decimals
//! ```
//!
//! Every step is a `BigFloat` operation at the configured precision
//! (at least 192 bits). The tick base 1.0001 is the exact rational
//! 10001/10000, not its `f64` approximation.
//!
//! Created: 2026-10-19

use crate::math::{ArithmeticError, BigFloat, DEFAULT_PRECISION};
use crate::types::{DecimalScale, MeanTick, PriceSample};
use std::num::NonZeroU64;
use tracing::debug;

/// Smallest precision that still resolves the 2^192 scale
pub const MIN_PRECISION: u32 = 192;

/// 1.0001 = 10001 / 10000
const TICK_BASE_DENOMINATOR: NonZeroU64 = match NonZeroU64::new(10_000) {
    Some(d) => d,
    None => panic!("tick base denominator is zero"),
};

/// Extra bits for the tick base so pow() starts from a tighter constant
const BASE_GUARD_BITS: u32 = 64;

#[derive(Debug, Clone)]
pub struct PriceConverter {
    precision: u32,
    tick_base: BigFloat,
}

impl Default for PriceConverter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl PriceConverter {
    /// Precisions below `MIN_PRECISION` are raised to it.
    pub fn new(precision: u32) -> Self {
        let precision = precision.max(MIN_PRECISION);
        let tick_base = BigFloat::ratio(10_001, TICK_BASE_DENOMINATOR, precision + BASE_GUARD_BITS);
        Self {
            precision,
            tick_base,
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// `sqrt(1.0001^tick) * 2^96`
    pub fn sqrt_ratio_at_tick(&self, tick: &MeanTick) -> Result<BigFloat, ArithmeticError> {
        let power = self.tick_base.pow(tick.value(), self.precision)?;
        Ok(power.sqrt(self.precision)?.mul_pow2(96))
    }

    /// Price of the tracked token in quote units, scaled by `10^decimals`.
    pub fn price_from_mean_tick(
        &self,
        mean_tick: &MeanTick,
        token_is_base: bool,
        scale: &DecimalScale,
    ) -> Result<PriceSample, ArithmeticError> {
        let p = self.precision;
        let sqrt_ratio = self.sqrt_ratio_at_tick(mean_tick)?;
        let ratio = sqrt_ratio.mul(&sqrt_ratio, p);
        let q192 = BigFloat::pow2(192);

        let (numerator, divisor) = if token_is_base {
            (&ratio, &q192)
        } else {
            (&q192, &ratio)
        };
        let price = numerator.div(divisor, p)?.mul(scale.factor(), p);

        debug!(
            "mean tick {} -> sqrtRatio {:.0}, price {} (token0 base: {}, decimals: {})",
            mean_tick,
            sqrt_ratio,
            price,
            token_is_base,
            scale.decimals()
        );
        Ok(PriceSample::new(price))
    }
}
