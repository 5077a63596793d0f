//! Token Role Resolution
//!
//! Decides whether the tracked token is the pool's base (token0) or quote
//! (token1) side. Pure: operates on addresses already read from the pool.
//!
//! Created: 2026-10-19

use crate::error::TwapError;
use alloy::primitives::Address;
use std::str::FromStr;

/// Parse a hex address, with or without the `0x` prefix, case-insensitively.
pub fn normalize_address(input: &str) -> Result<Address, TwapError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let invalid = |reason: String| TwapError::InvalidAddress {
        input: input.to_string(),
        reason,
    };

    if hex.len() != 40 {
        return Err(invalid(format!("expected 40 hex digits, got {}", hex.len())));
    }
    Address::from_str(hex).map_err(|e| invalid(e.to_string()))
}

/// Returns `true` when `token` is token0, `false` when it is token1.
pub fn resolve_token_role(
    pool: Address,
    token0: Address,
    token1: Address,
    token: Address,
) -> Result<bool, TwapError> {
    if token == token0 {
        Ok(true)
    } else if token == token1 {
        Ok(false)
    } else {
        Err(TwapError::TokenNotInPool {
            token,
            pool,
            token0,
            token1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // WETH / USDC on Ethereum mainnet
    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
    const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
    const POOL: &str = "0x8ad599c3A0ff1De082011EFDDc58f1908eb6e6D8";

    #[test]
    fn test_normalize_strips_prefix_and_case() {
        let canonical = normalize_address(USDC).unwrap();
        let bare = normalize_address(&USDC[2..].to_lowercase()).unwrap();
        let upper = normalize_address(&format!("0X{}", &USDC[2..].to_uppercase())).unwrap();
        assert_eq!(canonical, bare);
        assert_eq!(canonical, upper);
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_address("0x1234"),
            Err(TwapError::InvalidAddress { .. })
        ));
        assert!(normalize_address("zz86991c6218b36c1d19d4a2e9eb0ce3606eb48aa").is_err());
        assert!(normalize_address("").is_err());
    }

    #[test]
    fn test_token0_is_base() {
        let pool = normalize_address(POOL).unwrap();
        let usdc = normalize_address(USDC).unwrap();
        let weth = normalize_address(WETH).unwrap();
        assert!(resolve_token_role(pool, usdc, weth, usdc).unwrap());
    }

    #[test]
    fn test_token1_is_quote_side() {
        let pool = normalize_address(POOL).unwrap();
        let usdc = normalize_address(USDC).unwrap();
        let weth = normalize_address(WETH).unwrap();
        let tracked = normalize_address(&WETH.to_lowercase()).unwrap();
        assert!(!resolve_token_role(pool, usdc, weth, tracked).unwrap());
    }

    #[test]
    fn test_token_not_in_pool() {
        let pool = normalize_address(POOL).unwrap();
        let usdc = normalize_address(USDC).unwrap();
        let weth = normalize_address(WETH).unwrap();
        let stranger = Address::repeat_byte(0x42);
        match resolve_token_role(pool, usdc, weth, stranger) {
            Err(TwapError::TokenNotInPool { token, token0, token1, .. }) => {
                assert_eq!(token, stranger);
                assert_eq!(token0, usdc);
                assert_eq!(token1, weth);
            }
            other => panic!("expected TokenNotInPool, got {other:?}"),
        }
    }
}
