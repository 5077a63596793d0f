//! Logarithm, Exponential and Real Power for `BigFloat`
//!
//! All series run at `precision + GUARD_BITS` and round once at the end.
//!
//! - `ln`: binary range reduction `x = y * 2^n`, `y` in `[1, 2)`, then
//!   `ln y = 2 * atanh((y - 1) / (y + 1))`
//! - `exp`: `x = n * ln2 + r`, `r` halved `HALVINGS` times, Taylor series,
//!   then squared back up
//! - `pow`: `base^y = exp(y * ln(base))`
//!
//! Created: 2026-10-19

use super::bigfloat::{ArithmeticError, BigFloat};
use num_traits::ToPrimitive;

/// Extra working bits carried through series evaluation
const GUARD_BITS: u32 = 64;

/// Argument halvings before the exp Taylor series (costs HALVINGS bits of accuracy)
const HALVINGS: i64 = 16;

/// `exp` rejects arguments with binary magnitude above this
const MAX_EXP_TOP: i64 = 40;

/// `atanh(z)` for `|z| <= 1/3`
fn atanh(z: &BigFloat, precision: u32) -> Result<BigFloat, ArithmeticError> {
    if z.is_zero() {
        return Ok(BigFloat::zero());
    }

    let z2 = z.mul(z, precision);
    let floor = z.top() - i64::from(precision) - 2;
    let mut power = z.clone();
    let mut sum = BigFloat::zero();
    let mut k: u64 = 0;

    while !power.is_zero() && power.top() > floor {
        let term = power.div(&BigFloat::from(2 * k + 1), precision)?;
        sum = sum.add(&term, precision);
        power = power.mul(&z2, precision);
        k += 1;
    }
    Ok(sum)
}

/// Natural logarithm of 2, as `2 * atanh(1/3)`
pub fn ln2(precision: u32) -> Result<BigFloat, ArithmeticError> {
    let working = precision + GUARD_BITS;
    let third = BigFloat::one().div(&BigFloat::from(3u32), working)?;
    Ok(atanh(&third, working)?.mul_pow2(1).round(precision))
}

impl BigFloat {
    pub fn ln(&self, precision: u32) -> Result<BigFloat, ArithmeticError> {
        if !self.is_positive() {
            return Err(ArithmeticError::NonPositiveLog(self.to_string()));
        }

        let working = precision + GUARD_BITS;
        let n = self.top() - 1;
        let y = self.mul_pow2(-n);

        let numerator = y.sub(&BigFloat::one(), working);
        let denominator = y.add(&BigFloat::one(), working);
        let z = numerator.div(&denominator, working)?;
        let ln_y = atanh(&z, working)?.mul_pow2(1);

        if n == 0 {
            return Ok(ln_y.round(precision));
        }
        let scaled = ln2(working)?.mul(&BigFloat::from(n), working);
        Ok(scaled.add(&ln_y, precision))
    }

    pub fn exp(&self, precision: u32) -> Result<BigFloat, ArithmeticError> {
        if self.is_zero() {
            return Ok(BigFloat::one());
        }
        if self.top() > MAX_EXP_TOP {
            return Err(ArithmeticError::Overflow(self.to_string()));
        }

        // n * ln2 cancels up to top() leading bits of x
        let working = precision + GUARD_BITS + self.top().max(0) as u32;
        let l2 = ln2(working)?;
        let n = self
            .div(&l2, working)?
            .to_bigint_round()
            .to_i64()
            .ok_or_else(|| ArithmeticError::Overflow(self.to_string()))?;
        let r = self
            .sub(&l2.mul(&BigFloat::from(n), working), working)
            .mul_pow2(-HALVINGS);

        let floor = -i64::from(working) - 2;
        let mut sum = BigFloat::one();
        let mut term = BigFloat::one();
        let mut k: u64 = 1;
        loop {
            term = term.mul(&r, working).div(&BigFloat::from(k), working)?;
            if term.is_zero() || term.top() < floor {
                break;
            }
            sum = sum.add(&term, working);
            k += 1;
        }

        for _ in 0..HALVINGS {
            sum = sum.mul(&sum, working);
        }
        Ok(sum.mul_pow2(n).round(precision))
    }

    /// `self^exponent` for a positive base and any real exponent.
    pub fn pow(&self, exponent: &BigFloat, precision: u32) -> Result<BigFloat, ArithmeticError> {
        if !self.is_positive() {
            return Err(ArithmeticError::NonPositiveLog(self.to_string()));
        }
        if exponent.is_zero() {
            return Ok(BigFloat::one());
        }

        let working = precision + GUARD_BITS;
        let log = self.ln(working)?;
        exponent.mul(&log, working).exp(precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::DEFAULT_PRECISION;

    const P: u32 = DEFAULT_PRECISION;

    fn close(actual: &BigFloat, expected: f64) -> bool {
        let value = actual.to_f64();
        ((value - expected) / expected).abs() < 1e-14
    }

    #[test]
    fn test_ln2_digits() {
        // 0.693147180559945309417232121458176568075500134360255254120680...
        let value = ln2(P).unwrap();
        assert_eq!(
            value.to_decimal_string(40),
            "0.6931471805599453094172321214581765680755"
        );
    }

    #[test]
    fn test_ln_known_values() {
        assert_eq!(BigFloat::one().ln(P).unwrap(), BigFloat::zero());
        assert!(close(&BigFloat::from(10u32).ln(P).unwrap(), std::f64::consts::LN_10));
        assert!(close(&BigFloat::pow2(-3).ln(P).unwrap(), -3.0 * std::f64::consts::LN_2));
        let base: BigFloat = "1.0001".parse().unwrap();
        let expected: BigFloat =
            "0.0000999950003333083353331666809511310634820644010710755126612943216449"
                .parse()
                .unwrap();
        assert!(base.ln(P).unwrap().approx_eq(&expected, 230));
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert!(matches!(
            BigFloat::zero().ln(P),
            Err(ArithmeticError::NonPositiveLog(_))
        ));
        assert!(BigFloat::from(-1i64).ln(P).is_err());
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(BigFloat::zero().exp(P).unwrap(), BigFloat::one());
        assert!(close(&BigFloat::one().exp(P).unwrap(), std::f64::consts::E));
        assert!(close(&BigFloat::from(-20i64).exp(P).unwrap(), (-20f64).exp()));
        assert!(close(&BigFloat::from(88i64).exp(P).unwrap(), 88f64.exp()));
    }

    #[test]
    fn test_exp_of_ln_round_trips() {
        let x: BigFloat = "123.456".parse().unwrap();
        let back = x.ln(P).unwrap().exp(P).unwrap();
        assert!(back.approx_eq(&x, 240));
    }

    #[test]
    fn test_exp_overflow_rejected() {
        let huge = BigFloat::pow2(50);
        assert!(matches!(huge.exp(P), Err(ArithmeticError::Overflow(_))));
    }

    #[test]
    fn test_pow_fractional_and_negative_exponents() {
        let two = BigFloat::from(2u32);
        let half = BigFloat::pow2(-1);
        let root = two.pow(&half, P).unwrap();
        assert!(root.approx_eq(&two.sqrt(P).unwrap(), 240));

        let inverse = two.pow(&BigFloat::from(-1i64), P).unwrap();
        assert!(inverse.approx_eq(&half, 240));

        let cube = two.pow(&BigFloat::from(3u32), P).unwrap();
        assert!(cube.approx_eq(&BigFloat::from(8u32), 240));
    }

    #[test]
    fn test_pow_rejects_non_positive_base() {
        assert!(BigFloat::zero().pow(&BigFloat::one(), P).is_err());
    }
}
