use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One OHLCV candlestick for a trading pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Close of the latest finished bar, if the series has one
pub fn latest_close(candles: &[Candle]) -> Option<f64> {
    candles.last().map(|c| c.close)
}

/// Extract closing prices from a candle series
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Trading signal emitted by a single strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Direction of an executed trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The action that closes a position opened in this direction
    pub fn flip(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Actionable signals map to a side; `Hold` maps to nothing
    pub fn from_signal(signal: Signal) -> Option<Side> {
        match signal {
            Signal::Buy => Some(Side::Buy),
            Signal::Sell => Some(Side::Sell),
            Signal::Hold => None,
        }
    }

    /// Lowercase form expected by the exchange order API
    pub fn as_request(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Run/stop switch owned by the external control surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotState {
    Running,
    Stopped,
}

/// Risk knobs read back from the control surface each cycle
///
/// Missing fields fall back to the documented defaults, so a partially
/// written settings file still parses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
    pub sl_percent: f64,
    pub tp_percent: f64,
    pub budget: f64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            sl_percent: 3.0,
            tp_percent: 5.0,
            budget: 1000.0,
        }
    }
}

/// Why a ledger row was written
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeReason {
    #[serde(rename = "ENTRY")]
    Entry,
    #[serde(rename = "STOP-LOSS")]
    StopLoss,
    #[serde(rename = "TAKE-PROFIT")]
    TakeProfit,
    #[serde(rename = "SIMULATED STOP-LOSS")]
    SimulatedStopLoss,
}

impl std::fmt::Display for TradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeReason::Entry => write!(f, "ENTRY"),
            TradeReason::StopLoss => write!(f, "STOP-LOSS"),
            TradeReason::TakeProfit => write!(f, "TAKE-PROFIT"),
            TradeReason::SimulatedStopLoss => write!(f, "SIMULATED STOP-LOSS"),
        }
    }
}

/// The single open position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub pair: String,
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub opened_at: DateTime<Utc>,
}

/// One immutable row of the append-only trade ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub action: Side,
    pub price: f64,
    pub balance_after: f64,
    pub pnl: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub reason: TradeReason,
}
