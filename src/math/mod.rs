//! Arbitrary-precision arithmetic
//!
//! `BigFloat` replaces fixed-width floats wherever the tick math crosses
//! the 2^192 scale. Everything rounds to an explicit mantissa precision.

pub mod bigfloat;
pub mod transcendental;

pub use bigfloat::{ArithmeticError, BigFloat, DEFAULT_PRECISION, MAX_EXPONENT};
pub use transcendental::ln2;
