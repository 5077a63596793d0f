//! Price Codec
//!
//! Byte form of a `PriceSample` handed to the downstream price provider.
//! The mantissa travels as raw magnitude bytes, so decode(encode(x)) == x
//! for every value the converter produces, including ones wider than an
//! `f64` mantissa.
//!
//! Layout (big-endian):
//!
//! ```text
//! [version u8][sign u8][exponent i64][secs i64][nanos u32][len u32][mantissa; len]
//! ```
//!
//! Created: 2026-10-19

use crate::math::{BigFloat, DEFAULT_PRECISION, MAX_EXPONENT};
use crate::types::PriceSample;
use chrono::DateTime;
use num_bigint::{BigUint, Sign};
use thiserror::Error;

pub const CODEC_VERSION: u8 = 1;

/// version + sign + exponent + secs + nanos + len
pub const HEADER_LEN: usize = 1 + 1 + 8 + 8 + 4 + 4;

const SIGN_ZERO: u8 = 0;
const SIGN_POSITIVE: u8 = 1;
const SIGN_NEGATIVE: u8 = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("encoded price too short: {len} bytes, need at least {HEADER_LEN}")]
    TooShort { len: usize },

    #[error("unsupported codec version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid sign byte {0}")]
    InvalidSign(u8),

    #[error("mantissa length {declared} does not match {actual} trailing bytes")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("mantissa is not in canonical form")]
    NonCanonical,

    #[error("binary exponent {0} out of range")]
    ExponentOutOfRange(i64),

    #[error("invalid timestamp {secs}s + {nanos}ns")]
    InvalidTimestamp { secs: i64, nanos: u32 },

    #[error("multiplier {0} is not finite")]
    InvalidMultiplier(f64),
}

pub fn encode(sample: &PriceSample) -> Vec<u8> {
    let price = &sample.price;
    let sign = match price.sign() {
        Sign::NoSign => SIGN_ZERO,
        Sign::Plus => SIGN_POSITIVE,
        Sign::Minus => SIGN_NEGATIVE,
    };
    let mantissa = if price.is_zero() {
        Vec::new()
    } else {
        price.magnitude().to_bytes_be()
    };

    let mut out = Vec::with_capacity(HEADER_LEN + mantissa.len());
    out.push(CODEC_VERSION);
    out.push(sign);
    out.extend_from_slice(&price.exponent().to_be_bytes());
    out.extend_from_slice(&sample.computed_at.timestamp().to_be_bytes());
    out.extend_from_slice(&sample.computed_at.timestamp_subsec_nanos().to_be_bytes());
    out.extend_from_slice(&(mantissa.len() as u32).to_be_bytes());
    out.extend_from_slice(&mantissa);
    out
}

pub fn decode(bytes: &[u8]) -> Result<PriceSample, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TooShort { len: bytes.len() });
    }

    let version = bytes[0];
    if version != CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let sign = match bytes[1] {
        SIGN_ZERO => Sign::NoSign,
        SIGN_POSITIVE => Sign::Plus,
        SIGN_NEGATIVE => Sign::Minus,
        other => return Err(CodecError::InvalidSign(other)),
    };

    let exponent = i64::from_be_bytes(array_at(bytes, 2));
    if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() {
        return Err(CodecError::ExponentOutOfRange(exponent));
    }
    let secs = i64::from_be_bytes(array_at(bytes, 10));
    let nanos = u32::from_be_bytes(array_at(bytes, 18));
    let declared = u32::from_be_bytes(array_at(bytes, 22)) as usize;

    let body = &bytes[HEADER_LEN..];
    if body.len() != declared {
        return Err(CodecError::LengthMismatch {
            declared,
            actual: body.len(),
        });
    }
    // leading zero bytes would give a second encoding of the same value
    if body.first() == Some(&0) {
        return Err(CodecError::NonCanonical);
    }

    let price = BigFloat::from_canonical_parts(sign, BigUint::from_bytes_be(body), exponent)
        .ok_or(CodecError::NonCanonical)?;
    let computed_at = DateTime::from_timestamp(secs, nanos)
        .ok_or(CodecError::InvalidTimestamp { secs, nanos })?;

    Ok(PriceSample { price, computed_at })
}

/// Decode, apply an external multiplier, narrow to `f64`.
///
/// This is all a downstream consumer does with the bytes.
pub fn extract_price(bytes: &[u8], multiplier: f64) -> Result<f64, CodecError> {
    let sample = decode(bytes)?;
    let multiplier =
        BigFloat::from_f64(multiplier).map_err(|_| CodecError::InvalidMultiplier(multiplier))?;
    Ok(sample.price.mul(&multiplier, DEFAULT_PRECISION).to_f64())
}

fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[offset..offset + N]);
    buf
}
