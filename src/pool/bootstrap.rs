//! Connection Bootstrap
//!
//! One-shot startup: normalize addresses, open the pool handle under the
//! retry policy, read token0/token1 and resolve the tracked token's role.
//! Reconnecting means bootstrapping again; a `PoolIdentity` is never
//! patched in place.
//!
//! Created: 2026-10-19

use crate::error::TwapError;
use crate::pool::reader::{PoolReader, PoolTransport};
use crate::pool::resolver::{normalize_address, resolve_token_role};
use crate::pool::retry::RetryPolicy;
use crate::types::PoolIdentity;
use tracing::{info, warn};

/// Resolve pool identity and return it with an open handle.
pub async fn bootstrap<T: PoolTransport>(
    transport: &T,
    node_url: &str,
    pool_address: &str,
    token_address: &str,
    retry: &RetryPolicy,
) -> Result<(PoolIdentity, T::Reader), TwapError> {
    let pool = normalize_address(pool_address)?;
    let token = normalize_address(token_address)?;

    info!("Bootstrapping pool {:?} for token {:?}", pool, token);

    let mut reader = retry
        .run("Pool connection", move |_attempt| transport.open(node_url, pool))
        .await
        .map_err(|exhausted| TwapError::ConnectionFailed {
            url: node_url.to_string(),
            attempts: exhausted.attempts,
            source: exhausted.last_error,
        })?;

    let (token0, token1) = match reader.tokens().await {
        Ok(tokens) => tokens,
        Err(source) => {
            warn!("Failed to read pool tokens for {:?}: {:#}", pool, source);
            reader.hang_up();
            return Err(TwapError::OracleReadFailed { pool, source });
        }
    };

    let token_is_base = match resolve_token_role(pool, token0, token1, token) {
        Ok(is_base) => is_base,
        Err(e) => {
            reader.hang_up();
            return Err(e);
        }
    };

    let identity = PoolIdentity {
        pool,
        token,
        token0,
        token1,
        token_is_base,
    };
    info!("Connected: {} (quote token {:?})", identity, identity.quote_token());
    Ok((identity, reader))
}
