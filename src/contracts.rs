//! Contract Definitions
//!
//! Uniswap V3 pool interface, defined with alloy's `sol!` macro.
//! Only the calls the TWAP source needs: token identity and the
//! cumulative-tick oracle.

use alloy::sol;

// ── Uniswap V3 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface UniswapV3Pool {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function observe(uint32[] calldata secondsAgos) external view returns (int56[] memory tickCumulatives, uint160[] memory secondsPerLiquidityCumulativeX128s);
    }
}
