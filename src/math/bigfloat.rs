//! Arbitrary-Precision Binary Float
//!
//! `BigFloat` holds `mantissa * 2^exponent` with an unbounded `BigInt`
//! mantissa. Values are always kept canonical: the mantissa is odd (or the
//! value is exactly zero, stored as `0 * 2^0`). Two canonical values are
//! numerically equal iff they are structurally equal, so `==` is exact.
//!
//! Rounding happens only in the arithmetic operations, each of which takes
//! the target precision in mantissa bits. Conversions from integers and
//! dyadic values are exact.
//!
//! Created: 2026-10-19

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;
use thiserror::Error;

/// Default mantissa precision in bits (comfortably above the 2^192 scale)
pub const DEFAULT_PRECISION: u32 = 256;

/// Largest binary exponent magnitude accepted from external input
pub const MAX_EXPONENT: i64 = 1 << 48;

/// Decimal exponents beyond this are rejected when parsing literals
const MAX_DECIMAL_EXPONENT: i64 = 10_000;

/// Failures of the arbitrary-precision arithmetic
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("non-finite input value: {0}")]
    NonFinite(f64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("square root of negative value {0}")]
    NegativeSqrt(String),

    #[error("logarithm of non-positive value {0}")]
    NonPositiveLog(String),

    #[error("exponent argument {0} out of range")]
    Overflow(String),

    #[error("invalid decimal literal '{0}'")]
    InvalidLiteral(String),
}

/// Arbitrary-precision binary floating point value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
}

impl BigFloat {
    pub fn zero() -> Self {
        Self {
            mantissa: BigInt::zero(),
            exponent: 0,
        }
    }

    pub fn one() -> Self {
        Self::pow2(0)
    }

    /// Exactly `2^k`
    pub fn pow2(k: i64) -> Self {
        Self {
            mantissa: BigInt::from(1u32),
            exponent: k,
        }
    }

    /// Exact conversion from a finite `f64`.
    pub fn from_f64(value: f64) -> Result<Self, ArithmeticError> {
        if !value.is_finite() {
            return Err(ArithmeticError::NonFinite(value));
        }
        if value == 0.0 {
            return Ok(Self::zero());
        }

        let bits = value.to_bits();
        let sign = if bits >> 63 == 1 { Sign::Minus } else { Sign::Plus };
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1u64 << 52) - 1);

        // Subnormals have no implicit leading bit
        let (mantissa, exponent) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };

        Ok(Self::from_sign_magnitude(
            sign,
            BigUint::from(mantissa),
            exponent,
        ))
    }

    /// Rebuild a value from its canonical parts.
    ///
    /// Returns `None` when the parts are not canonical (even mantissa, or a
    /// sign that disagrees with a zero/non-zero magnitude).
    pub fn from_canonical_parts(sign: Sign, magnitude: BigUint, exponent: i64) -> Option<Self> {
        match sign {
            Sign::NoSign => {
                if magnitude.is_zero() && exponent == 0 {
                    Some(Self::zero())
                } else {
                    None
                }
            }
            Sign::Plus | Sign::Minus => {
                if magnitude.is_zero() || !magnitude.bit(0) {
                    return None;
                }
                Some(Self {
                    mantissa: BigInt::from_biguint(sign, magnitude),
                    exponent,
                })
            }
        }
    }

    pub fn sign(&self) -> Sign {
        self.mantissa.sign()
    }

    pub fn magnitude(&self) -> &BigUint {
        self.mantissa.magnitude()
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.sign() == Sign::Minus
    }

    pub fn is_positive(&self) -> bool {
        self.sign() == Sign::Plus
    }

    /// Binary order of magnitude: `|self|` lies in `[2^(top-1), 2^top)`.
    /// `i64::MIN` for zero.
    pub fn top(&self) -> i64 {
        if self.is_zero() {
            return i64::MIN;
        }
        self.magnitude().bits() as i64 + self.exponent
    }

    pub fn neg(&self) -> Self {
        Self {
            mantissa: -self.mantissa.clone(),
            exponent: self.exponent,
        }
    }

    pub fn abs(&self) -> Self {
        Self {
            mantissa: BigInt::from(self.magnitude().clone()),
            exponent: self.exponent,
        }
    }

    /// Exact multiplication by `2^k`.
    pub fn mul_pow2(&self, k: i64) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        Self {
            mantissa: self.mantissa.clone(),
            exponent: self.exponent + k,
        }
    }

    /// Round to at most `precision` mantissa bits.
    pub fn round(&self, precision: u32) -> Self {
        Self::rounded(self.sign(), self.magnitude().clone(), self.exponent, precision)
    }

    pub fn add(&self, other: &Self, precision: u32) -> Self {
        if self.is_zero() {
            return other.round(precision);
        }
        if other.is_zero() {
            return self.round(precision);
        }

        // Operand too small to reach the last kept bit
        let reach = i64::from(precision) + 2;
        if self.top() - other.top() > reach {
            return self.round(precision);
        }
        if other.top() - self.top() > reach {
            return other.round(precision);
        }

        let exponent = self.exponent.min(other.exponent);
        let lhs = &self.mantissa << (self.exponent - exponent) as usize;
        let rhs = &other.mantissa << (other.exponent - exponent) as usize;
        let (sign, magnitude) = (lhs + rhs).into_parts();
        Self::rounded(sign, magnitude, exponent, precision)
    }

    pub fn sub(&self, other: &Self, precision: u32) -> Self {
        self.add(&other.neg(), precision)
    }

    pub fn mul(&self, other: &Self, precision: u32) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        Self::rounded(
            self.sign() * other.sign(),
            self.magnitude() * other.magnitude(),
            self.exponent + other.exponent,
            precision,
        )
    }

    pub fn div(&self, other: &Self, precision: u32) -> Result<Self, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }

        Ok(Self::quotient(
            self.sign() * other.sign(),
            self.magnitude(),
            other.magnitude(),
            self.exponent - other.exponent,
            precision,
        ))
    }

    /// `numerator / denominator`, rounded to `precision` bits.
    pub fn ratio(numerator: u64, denominator: NonZeroU64, precision: u32) -> Self {
        if numerator == 0 {
            return Self::zero();
        }
        Self::quotient(
            Sign::Plus,
            &BigUint::from(numerator),
            &BigUint::from(denominator.get()),
            0,
            precision,
        )
    }

    pub fn sqrt(&self, precision: u32) -> Result<Self, ArithmeticError> {
        match self.sign() {
            Sign::NoSign => return Ok(Self::zero()),
            Sign::Minus => return Err(ArithmeticError::NegativeSqrt(self.to_string())),
            Sign::Plus => {}
        }

        let magnitude = self.magnitude();
        let mut shift = (2 * i64::from(precision) + 2 - magnitude.bits() as i64).max(0);
        if (self.exponent - shift).rem_euclid(2) != 0 {
            shift += 1;
        }
        let root = (magnitude << shift as usize).sqrt();

        Ok(Self::rounded(
            Sign::Plus,
            root,
            (self.exponent - shift) / 2,
            precision,
        ))
    }

    /// Nearest integer, ties away from zero.
    pub fn to_bigint_round(&self) -> BigInt {
        if self.is_zero() {
            return BigInt::zero();
        }
        if self.exponent >= 0 {
            return &self.mantissa << self.exponent as usize;
        }

        let shift = self.exponent.unsigned_abs();
        let magnitude = self.magnitude();
        if shift > magnitude.bits() {
            return BigInt::zero();
        }
        let mut quotient = magnitude >> shift as usize;
        if magnitude.bit(shift - 1) {
            quotient += 1u32;
        }
        BigInt::from_biguint(self.sign(), quotient)
    }

    /// Nearest `f64`. Values beyond the `f64` range saturate to infinity or zero.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }

        let magnitude = self.magnitude();
        let bits = magnitude.bits();
        let (head, dropped) = if bits > 64 {
            (magnitude >> (bits - 64) as usize, bits - 64)
        } else {
            (magnitude.clone(), 0)
        };
        let head = head.to_f64().unwrap_or(f64::INFINITY);

        let exponent = self
            .exponent
            .saturating_add(dropped as i64)
            .clamp(-2200, 2200) as i32;
        let half = exponent / 2;
        let value = head * 2f64.powi(half) * 2f64.powi(exponent - half);

        if self.is_negative() {
            -value
        } else {
            value
        }
    }

    /// True when `|self - other| <= 2^-bits * max(|self|, |other|)`.
    pub fn approx_eq(&self, other: &Self, bits: u32) -> bool {
        if self == other {
            return true;
        }
        let scale = self.top().max(other.top());
        let precision = bits + 64;
        let diff = self.sub(other, precision);
        diff.is_zero() || diff.top() <= scale - i64::from(bits)
    }

    /// Decimal rendering with at most `fraction_digits` digits after the point
    /// (rounded half up, trailing zeros trimmed).
    pub fn to_decimal_string(&self, fraction_digits: usize) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let magnitude = self.magnitude();

        if self.exponent >= 0 {
            let integer = magnitude << self.exponent as usize;
            return format!("{sign}{integer}");
        }

        let shift = self.exponent.unsigned_abs() as usize;
        let mut integer = magnitude >> shift;
        let fraction = magnitude - (&integer << shift);

        let unit = BigUint::from(10u32).pow(fraction_digits as u32);
        let half = BigUint::from(1u32) << (shift - 1);
        let mut digits = (fraction * &unit + half) >> shift;
        if digits >= unit {
            integer += 1u32;
            digits -= &unit;
        }

        let padded = format!("{:0>width$}", digits.to_string(), width = fraction_digits);
        let trimmed = padded.trim_end_matches('0');
        if trimmed.is_empty() || fraction_digits == 0 {
            if integer.is_zero() {
                return "0".to_string();
            }
            format!("{sign}{integer}")
        } else {
            format!("{sign}{integer}.{trimmed}")
        }
    }

    /// Parse a decimal literal (`-12.5`, `6931.47`, `1e-6`), rounding
    /// non-dyadic values to `precision` bits.
    pub fn parse_decimal(input: &str, precision: u32) -> Result<Self, ArithmeticError> {
        let invalid = || ArithmeticError::InvalidLiteral(input.to_string());
        let text = input.trim();

        let (negative, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };

        let (body, exponent) = match text.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i64 = text[pos + 1..].parse().map_err(|_| invalid())?;
                (&text[..pos], exponent)
            }
            None => (text, 0),
        };
        if exponent.abs() > MAX_DECIMAL_EXPONENT {
            return Err(invalid());
        }

        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{integer}{fraction}");
        let mut value = BigInt::from_str(&digits).map_err(|_| invalid())?;
        if negative {
            value = -value;
        }

        // value * 10^(exponent - fraction digits)
        let scale = exponent - fraction.len() as i64;
        let ten = BigInt::from(10u32);
        if scale >= 0 {
            return Ok(Self::from(value * ten.pow(scale as u32)));
        }
        let divisor = Self::from(ten.pow(scale.unsigned_abs() as u32));
        Self::from(value).div(&divisor, precision)
    }

    /// `numerator / divisor * 2^exponent` for a non-zero divisor
    fn quotient(
        sign: Sign,
        numerator: &BigUint,
        divisor: &BigUint,
        exponent: i64,
        precision: u32,
    ) -> Self {
        // Quotient keeps at least precision + 1 bits before rounding
        let shift = (i64::from(precision) + 2 + divisor.bits() as i64 - numerator.bits() as i64)
            .max(0);
        let quotient = (numerator << shift as usize) / divisor;
        Self::rounded(sign, quotient, exponent - shift, precision)
    }

    fn from_sign_magnitude(sign: Sign, magnitude: BigUint, exponent: i64) -> Self {
        if magnitude.is_zero() || sign == Sign::NoSign {
            return Self::zero();
        }
        let zeros = magnitude.trailing_zeros().unwrap_or(0);
        Self {
            mantissa: BigInt::from_biguint(sign, magnitude >> zeros as usize),
            exponent: exponent + zeros as i64,
        }
    }

    fn rounded(sign: Sign, magnitude: BigUint, exponent: i64, precision: u32) -> Self {
        let precision = u64::from(precision.max(1));
        let bits = magnitude.bits();
        if bits <= precision {
            return Self::from_sign_magnitude(sign, magnitude, exponent);
        }

        let dropped = bits - precision;
        let round_up = magnitude.bit(dropped - 1);
        let mut kept = magnitude >> dropped as usize;
        if round_up {
            kept += 1u32;
        }
        Self::from_sign_magnitude(sign, kept, exponent + dropped as i64)
    }
}

impl From<BigInt> for BigFloat {
    fn from(value: BigInt) -> Self {
        let (sign, magnitude) = value.into_parts();
        Self::from_sign_magnitude(sign, magnitude, 0)
    }
}

impl From<i64> for BigFloat {
    fn from(value: i64) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl From<u64> for BigFloat {
    fn from(value: u64) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl From<u32> for BigFloat {
    fn from(value: u32) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl FromStr for BigFloat {
    type Err = ArithmeticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_decimal(s, DEFAULT_PRECISION)
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = |sign: Sign| match sign {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        };
        match rank(self.sign()).cmp(&rank(other.sign())) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        if self.is_zero() {
            return Ordering::Equal;
        }

        let exponent = self.exponent.min(other.exponent);
        let by_magnitude = match self.top().cmp(&other.top()) {
            Ordering::Equal => {
                let lhs = self.magnitude() << (self.exponent - exponent) as usize;
                let rhs = other.magnitude() << (other.exponent - exponent) as usize;
                lhs.cmp(&rhs)
            }
            unequal => unequal,
        };

        if self.is_negative() {
            by_magnitude.reverse()
        } else {
            by_magnitude
        }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal_string(f.precision().unwrap_or(24)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: u32 = DEFAULT_PRECISION;

    #[test]
    fn test_canonical_form_strips_trailing_zeros() {
        let x = BigFloat::from(96i64);
        assert_eq!(x.magnitude(), &BigUint::from(3u32));
        assert_eq!(x.exponent(), 5);
        assert_eq!(BigFloat::from(0i64), BigFloat::zero());
    }

    #[test]
    fn test_exact_integer_arithmetic() {
        let a = BigFloat::from(1_000_000i64);
        let b = BigFloat::from(-250i64);
        assert_eq!(a.add(&b, P), BigFloat::from(999_750i64));
        assert_eq!(a.mul(&b, P), BigFloat::from(-250_000_000i64));
        assert_eq!(a.div(&b, P).unwrap(), BigFloat::from(-4000i64));
        assert_eq!(b.sub(&a, P), BigFloat::from(-1_000_250i64));
    }

    #[test]
    fn test_ratio() {
        let four = NonZeroU64::new(4).unwrap();
        assert_eq!(BigFloat::ratio(3, four, P), BigFloat::from_f64(0.75).unwrap());
        assert_eq!(BigFloat::ratio(0, four, P), BigFloat::zero());

        let ten_thousand = NonZeroU64::new(10_000).unwrap();
        let divided = BigFloat::from(10_001u32)
            .div(&BigFloat::from(10_000u32), P)
            .unwrap();
        assert_eq!(BigFloat::ratio(10_001, ten_thousand, P), divided);
    }

    #[test]
    fn test_division_by_zero() {
        let err = BigFloat::one().div(&BigFloat::zero(), P).unwrap_err();
        assert_eq!(err, ArithmeticError::DivisionByZero);
    }

    #[test]
    fn test_sqrt_of_perfect_square_is_exact() {
        let x = BigFloat::pow2(192);
        assert_eq!(x.sqrt(P).unwrap(), BigFloat::pow2(96));
        assert_eq!(BigFloat::from(144i64).sqrt(P).unwrap(), BigFloat::from(12i64));
        assert_eq!(BigFloat::pow2(-6).sqrt(P).unwrap(), BigFloat::pow2(-3));
    }

    #[test]
    fn test_sqrt_two_matches_f64() {
        let root = BigFloat::from(2i64).sqrt(P).unwrap();
        assert!((root.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-15);
        // squaring back lands within the last few bits
        assert!(root.mul(&root, P).approx_eq(&BigFloat::from(2i64), P - 4));
    }

    #[test]
    fn test_sqrt_negative_fails() {
        let err = BigFloat::from(-4i64).sqrt(P).unwrap_err();
        assert!(matches!(err, ArithmeticError::NegativeSqrt(_)));
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(BigFloat::from_f64(0.5).unwrap(), BigFloat::pow2(-1));
        assert_eq!(BigFloat::from_f64(-3.0).unwrap(), BigFloat::from(-3i64));
        assert_eq!(BigFloat::from_f64(1.0001).unwrap().to_f64(), 1.0001);
        assert!(matches!(
            BigFloat::from_f64(f64::NAN),
            Err(ArithmeticError::NonFinite(_))
        ));
        assert!(BigFloat::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_decimal() {
        let x: BigFloat = "6931.47".parse().unwrap();
        assert!((x.to_f64() - 6931.47).abs() < 1e-9);
        assert_eq!("-12.5".parse::<BigFloat>().unwrap(), BigFloat::from_f64(-12.5).unwrap());
        assert_eq!("1e6".parse::<BigFloat>().unwrap(), BigFloat::from(1_000_000i64));
        assert!("12.x".parse::<BigFloat>().is_err());
        assert!("".parse::<BigFloat>().is_err());
        assert!(".".parse::<BigFloat>().is_err());
    }

    #[test]
    fn test_decimal_rendering() {
        assert_eq!(BigFloat::from(1_000_000i64).to_string(), "1000000");
        assert_eq!(BigFloat::from_f64(-2.75).unwrap().to_string(), "-2.75");
        let third = BigFloat::one().div(&BigFloat::from(3i64), P).unwrap();
        assert_eq!(format!("{third:.6}"), "0.333333");
        let two_thirds = BigFloat::from(2i64).div(&BigFloat::from(3i64), P).unwrap();
        assert_eq!(two_thirds.to_decimal_string(4), "0.6667");
        assert_eq!(BigFloat::from_f64(0.9999999).unwrap().to_decimal_string(2), "1");
    }

    #[test]
    fn test_ordering() {
        let values: Vec<BigFloat> = [-3.5, -0.25, 0.0, 0.125, 7.0]
            .iter()
            .map(|v| BigFloat::from_f64(*v).unwrap())
            .collect();
        for pair in values.windows(2) {
            assert!(pair[0] < pair[1], "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_rounding_to_precision() {
        // 2^70 + 1 does not fit in 64 bits; rounds to 2^70
        let x = BigFloat::pow2(70).add(&BigFloat::one(), 300);
        assert_eq!(x.round(64), BigFloat::pow2(70));
        assert_ne!(x, BigFloat::pow2(70));
    }

    #[test]
    fn test_to_bigint_round() {
        assert_eq!(BigFloat::from_f64(2.5).unwrap().to_bigint_round(), BigInt::from(3));
        assert_eq!(BigFloat::from_f64(-2.4).unwrap().to_bigint_round(), BigInt::from(-2));
        assert_eq!(BigFloat::from_f64(0.3).unwrap().to_bigint_round(), BigInt::from(0));
    }

    #[test]
    fn test_canonical_parts_validation() {
        assert!(BigFloat::from_canonical_parts(Sign::Plus, BigUint::from(4u32), 0).is_none());
        assert!(BigFloat::from_canonical_parts(Sign::NoSign, BigUint::from(1u32), 0).is_none());
        assert_eq!(
            BigFloat::from_canonical_parts(Sign::Minus, BigUint::from(5u32), -1),
            Some(BigFloat::from_f64(-2.5).unwrap())
        );
    }
}
