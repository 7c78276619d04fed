// Market data module
pub mod coindcx;

pub use coindcx::CoinDcxFeed;

use crate::models::Candle;
use async_trait::async_trait;

/// Source of candle history for a trading pair
///
/// Implementations never fail: any fetch or decode problem yields an empty
/// series, which callers treat as "no data this cycle".
#[async_trait]
pub trait CandleFeed: Send + Sync {
    async fn fetch_candles(&self, pair: &str) -> Vec<Candle>;
}
