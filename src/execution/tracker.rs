use chrono::Utc;
use uuid::Uuid;

use crate::market::CandleFeed;
use crate::models::{
    latest_close, LedgerEntry, Position, RiskSettings, Side, TradeReason,
};
use crate::store::TradeLedger;

/// Whether the bot currently holds its one position
#[derive(Debug, Clone)]
pub enum TradeState {
    Flat,
    InPosition(Position),
}

/// Errors a caller can act on when driving the tracker
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("already holding an open position for {0}")]
    AlreadyInPosition(String),
    #[error("ledger write failed: {0}")]
    Ledger(#[from] anyhow::Error),
}

/// Owner of the single position's lifecycle and the running budget
///
/// The budget changes only when a position closes; opening sizes the position
/// from the budget without spending it. Every open and close appends exactly
/// one row to the injected ledger.
pub struct PositionTracker {
    state: TradeState,
    budget: f64,
    sl_percent: f64,
    tp_percent: f64,
    ledger: Box<dyn TradeLedger>,
    simulation_pair: Option<String>,
}

impl PositionTracker {
    pub fn new(settings: &RiskSettings, ledger: Box<dyn TradeLedger>) -> Self {
        Self {
            state: TradeState::Flat,
            budget: settings.budget,
            sl_percent: settings.sl_percent,
            tp_percent: settings.tp_percent,
            ledger,
            simulation_pair: None,
        }
    }

    /// Treat `pair` as a deterministic stop-loss trigger: checking it closes
    /// the position at `stop_loss - 1` without touching the candle feed.
    pub fn with_simulation_pair(mut self, pair: impl Into<String>) -> Self {
        self.simulation_pair = Some(pair.into());
        self
    }

    pub fn state(&self) -> &TradeState {
        &self.state
    }

    pub fn in_trade(&self) -> bool {
        matches!(self.state, TradeState::InPosition(_))
    }

    pub fn active_position(&self) -> Option<&Position> {
        match &self.state {
            TradeState::InPosition(position) => Some(position),
            TradeState::Flat => None,
        }
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn ledger(&self) -> &dyn TradeLedger {
        self.ledger.as_ref()
    }

    /// Refresh the stop-loss/take-profit percentages from the control surface.
    /// The budget is seeded once at construction; the tracker owns it after.
    pub fn update_risk(&mut self, settings: &RiskSettings) {
        self.sl_percent = settings.sl_percent;
        self.tp_percent = settings.tp_percent;
    }

    /// Open the position: Flat -> InPosition
    ///
    /// Thresholds are computed from the entry price regardless of side (the
    /// short case inverts only the comparisons, see `check`). The budget is
    /// untouched here.
    pub fn open(&mut self, pair: &str, side: Side, entry_price: f64) -> Result<Uuid, TrackerError> {
        if let TradeState::InPosition(position) = &self.state {
            return Err(TrackerError::AlreadyInPosition(position.pair.clone()));
        }

        let stop_loss = entry_price * (1.0 - self.sl_percent / 100.0);
        let take_profit = entry_price * (1.0 + self.tp_percent / 100.0);
        let quantity = self.budget / entry_price;

        let position = Position {
            id: Uuid::new_v4(),
            pair: pair.to_string(),
            side,
            entry_price,
            quantity,
            stop_loss,
            take_profit,
            opened_at: Utc::now(),
        };

        self.append_row(
            pair,
            side,
            entry_price,
            self.budget,
            0.0,
            stop_loss,
            take_profit,
            TradeReason::Entry,
        )
        .map_err(TrackerError::Ledger)?;

        tracing::info!(
            "{} {} @ {:.2} | bal: {:.2} | pnl: +0.00 | sl: {:.2} | tp: {:.2} | {}",
            pair,
            side,
            entry_price,
            self.budget,
            stop_loss,
            take_profit,
            TradeReason::Entry
        );

        let id = position.id;
        self.state = TradeState::InPosition(position);
        Ok(id)
    }

    /// Exit check: InPosition -> maybe Flat
    ///
    /// Fetches the latest close for the held pair from the feed; when no
    /// price is available the check defers to the next cycle. Returns the
    /// reason when the position was closed this call.
    pub async fn check(&mut self, feed: &dyn CandleFeed) -> anyhow::Result<Option<TradeReason>> {
        let position = match &self.state {
            TradeState::InPosition(position) => position.clone(),
            TradeState::Flat => return Ok(None),
        };

        if self.simulation_pair.as_deref() == Some(position.pair.as_str()) {
            tracing::info!("Simulating stop-loss hit for {}", position.pair);
            let synthetic_price = position.stop_loss - 1.0;
            self.close(synthetic_price, TradeReason::SimulatedStopLoss)?;
            return Ok(Some(TradeReason::SimulatedStopLoss));
        }

        let candles = feed.fetch_candles(&position.pair).await;
        let Some(price) = latest_close(&candles) else {
            tracing::warn!("Skipping {}: no valid price data", position.pair);
            return Ok(None);
        };

        let exit = match position.side {
            Side::Buy => {
                if price <= position.stop_loss {
                    Some(TradeReason::StopLoss)
                } else if price >= position.take_profit {
                    Some(TradeReason::TakeProfit)
                } else {
                    None
                }
            }
            // Short positions keep long-style threshold values; only the
            // comparisons are mirrored.
            Side::Sell => {
                if price >= position.stop_loss {
                    Some(TradeReason::StopLoss)
                } else if price <= position.take_profit {
                    Some(TradeReason::TakeProfit)
                } else {
                    None
                }
            }
        };

        if let Some(reason) = exit {
            self.close(price, reason)?;
        }

        Ok(exit)
    }

    /// Close the position: InPosition -> Flat
    ///
    /// Realized pnl is taken against the current budget, which also sized the
    /// position at open.
    fn close(&mut self, exit_price: f64, reason: TradeReason) -> anyhow::Result<()> {
        let position = match &self.state {
            TradeState::InPosition(position) => position.clone(),
            TradeState::Flat => anyhow::bail!("no open position to close"),
        };

        let value = position.quantity * exit_price;
        let pnl = value - self.budget;
        let balance_after = self.budget + pnl;
        let action = position.side.flip();

        self.append_row(
            &position.pair,
            action,
            exit_price,
            balance_after,
            pnl,
            position.stop_loss,
            position.take_profit,
            reason,
        )?;

        self.budget = balance_after;
        self.state = TradeState::Flat;

        tracing::info!(
            "{} {} @ {:.2} | bal: {:.2} | pnl: {:+.2} | sl: {:.2} | tp: {:.2} | {}",
            position.pair,
            action,
            exit_price,
            self.budget,
            pnl,
            position.stop_loss,
            position.take_profit,
            reason
        );

        Ok(())
    }

    /// Durable-state hook run once per cycle
    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.ledger.flush()
    }

    #[allow(clippy::too_many_arguments)]
    fn append_row(
        &mut self,
        pair: &str,
        action: Side,
        price: f64,
        balance_after: f64,
        pnl: f64,
        stop_loss: f64,
        take_profit: f64,
        reason: TradeReason,
    ) -> anyhow::Result<()> {
        let entry = LedgerEntry {
            timestamp: Utc::now(),
            pair: pair.to_string(),
            action,
            price,
            balance_after,
            pnl,
            stop_loss,
            take_profit,
            reason,
        };
        self.ledger.append(&entry)
    }
}
