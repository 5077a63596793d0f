//! TWAP Feed Binary
//!
//! Bootstraps one Uniswap V3 pool and publishes its TWAP price on a fixed
//! interval until Ctrl-C. Each tick is decoded and multiplied exactly the
//! way the downstream price provider consumes it.
//!
//! Usage:
//!   twap-feed --config config/twap.toml
//!   twap-feed --config config/twap.toml --once --json
//!
//! Created: 2026-10-19

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use twap_oracle::twap::codec;
use twap_oracle::{FeedConfig, FeedSettings, RpcTransport, TwapFeed};

/// Uniswap V3 TWAP price feed
#[derive(Parser)]
#[command(name = "twap-feed")]
struct Args {
    /// Path to the TOML configuration
    #[arg(short, long, env = "TWAP_CONFIG", default_value = "config/twap.toml")]
    config: PathBuf,

    /// Publish a single price and exit
    #[arg(long)]
    once: bool,

    /// Print one JSON record per price on stdout
    #[arg(long)]
    json: bool,
}

/// One published price, as printed with `--json`
#[derive(Serialize)]
struct PriceRecord {
    timestamp: String,
    pool: String,
    token: String,
    window_seconds: u32,
    price: String,
    multiplier: f64,
    value: f64,
    encoded_len: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("===========================================");
    info!("   Uniswap V3 TWAP Feed");
    info!("===========================================");

    let config = FeedConfig::load(&args.config)?;
    let url: String = config.node.url.chars().take(40).collect();
    info!("RPC URL: {}", url);
    info!("Pool: {} | token: {}", config.pool.address, config.pool.token);
    info!(
        "Window: {}s | poll interval: {}ms | multiplier: {}",
        config.twap.window_seconds, config.twap.poll_interval_ms, config.twap.multiplier
    );

    let settings = FeedSettings::from(&config);
    let feed = TwapFeed::connect(&settings, &RpcTransport)
        .await
        .context("Failed to bootstrap pool")?;

    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
        }

        match feed.poll_price().await {
            Ok(bytes) => publish(&feed, &bytes, config.twap.multiplier, args.json)?,
            Err(e) if e.is_fatal() => {
                error!("Fatal feed error: {}", e);
                feed.hang_up().await;
                return Err(e.into());
            }
            // transient: keep polling
            Err(e) => warn!("Skipping tick: {}", e),
        }

        if args.once {
            break;
        }
    }

    feed.hang_up().await;
    Ok(())
}

fn publish<R: twap_oracle::PoolReader>(
    feed: &TwapFeed<R>,
    bytes: &[u8],
    multiplier: f64,
    json: bool,
) -> Result<()> {
    let sample = codec::decode(bytes)?;
    let value = codec::extract_price(bytes, multiplier)?;
    let identity = feed.identity();

    info!(
        "{} price {} x {} = {:.8}",
        identity.token,
        sample.price.to_decimal_string(12),
        multiplier,
        value
    );

    if json {
        let record = PriceRecord {
            timestamp: sample.computed_at.to_rfc3339(),
            pool: identity.pool.to_string(),
            token: identity.token.to_string(),
            window_seconds: feed.window_seconds(),
            price: sample.price.to_decimal_string(18),
            multiplier,
            value,
            encoded_len: bytes.len(),
        };
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
