//! Pool access module
//!
//! Handles connecting to a Uniswap V3 pool, resolving which side the
//! tracked token sits on, and reading the cumulative-tick oracle.

pub mod bootstrap;
pub mod reader;
pub mod resolver;
pub mod retry;

pub use bootstrap::bootstrap;
pub use reader::{PoolReader, PoolTransport, RpcPoolReader, RpcTransport};
pub use resolver::{normalize_address, resolve_token_role};
pub use retry::{RetryExhausted, RetryPolicy};
