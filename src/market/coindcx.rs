use super::CandleFeed;
use crate::models::Candle;
use crate::Result;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

const COINDCX_PUBLIC_BASE: &str = "https://public.coindcx.com";
const CANDLE_INTERVAL: &str = "15m";

/// Client for the CoinDCX public market-data API
#[derive(Clone)]
pub struct CoinDcxFeed {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawCandle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    // Bar open time, unix milliseconds
    time: i64,
}

impl CoinDcxFeed {
    pub fn new() -> Self {
        Self::with_base_url(COINDCX_PUBLIC_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Map a dashboard pair like `SOL-INR` to the API market name `I-SOL_INR`
    fn market_name(pair: &str) -> String {
        format!("I-{}", pair.replace('-', "_"))
    }

    async fn fetch_once(&self, pair: &str) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/market_data/candles?pair={}&interval={}",
            self.base_url,
            Self::market_name(pair),
            CANDLE_INTERVAL
        );

        let response = self.client.get(&url).send().await?;
        let raw: Vec<RawCandle> = response.json().await?;

        let mut candles: Vec<Candle> = raw
            .into_iter()
            .filter_map(|r| {
                let timestamp = DateTime::from_timestamp_millis(r.time)?;
                Some(Candle {
                    pair: pair.to_string(),
                    timestamp,
                    open: r.open,
                    high: r.high,
                    low: r.low,
                    close: r.close,
                    volume: r.volume,
                })
            })
            .collect();

        // The API returns newest-first; the core expects chronological order
        candles.sort_by_key(|c| c.timestamp);

        Ok(candles)
    }
}

impl Default for CoinDcxFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandleFeed for CoinDcxFeed {
    async fn fetch_candles(&self, pair: &str) -> Vec<Candle> {
        match self.fetch_once(pair).await {
            Ok(candles) => {
                if candles.is_empty() {
                    tracing::warn!("No candle data returned for {}", pair);
                }
                candles
            }
            Err(e) => {
                tracing::warn!("Candle fetch failed for {}: {}", pair, e);
                Vec::new()
            }
        }
    }
}
