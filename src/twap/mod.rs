//! TWAP pricing pipeline
//!
//! sampler (mean tick) -> converter (price) -> codec (bytes), wired
//! together per pool by `TwapFeed`.

pub mod codec;
pub mod converter;
pub mod feed;
pub mod sampler;

pub use codec::{decode, encode, extract_price, CodecError};
pub use converter::PriceConverter;
pub use feed::{FeedSettings, TwapFeed};
pub use sampler::{Throttle, TwapSampler, DEFAULT_MIN_UPDATE_INTERVAL};
