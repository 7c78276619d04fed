// Trading loop controller
//
// One cycle per tick: read the control surface, run the exit check when a
// position is open, otherwise scan the coin universe for the first
// actionable signal. `run` only adds the sleep between ticks, so cadence and
// behavior are testable without wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::execution::{ExecutionBackend, PositionTracker};
use crate::market::CandleFeed;
use crate::models::{latest_close, BotState, Side, Signal, TradeReason};
use crate::store::ControlSurface;
use crate::strategy::{SignalPolicy, Strategy};

const SCAN_INTERVAL: Duration = Duration::from_secs(10);
const PAUSE_INTERVAL: Duration = Duration::from_secs(5);

/// What a single cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Control surface says stopped: no scanning and no exit checks
    Paused,
    /// Holding a position, so only the exit check ran
    Checked { closed: Option<TradeReason> },
    /// Scanned the whole universe without an actionable signal
    Idle,
    /// First actionable signal was dispatched to the execution backend
    Entered {
        pair: String,
        side: Side,
        accepted: bool,
    },
}

pub struct TradeLoop {
    coins: Vec<String>,
    feed: Arc<dyn CandleFeed>,
    control: Box<dyn ControlSurface>,
    tracker: Arc<Mutex<PositionTracker>>,
    backend: Box<dyn ExecutionBackend>,
    strategies: Vec<Box<dyn Strategy>>,
    policy: Box<dyn SignalPolicy>,
    scan_interval: Duration,
    pause_interval: Duration,
}

impl TradeLoop {
    pub fn new(
        coins: Vec<String>,
        feed: Arc<dyn CandleFeed>,
        control: Box<dyn ControlSurface>,
        tracker: Arc<Mutex<PositionTracker>>,
        backend: Box<dyn ExecutionBackend>,
        strategies: Vec<Box<dyn Strategy>>,
        policy: Box<dyn SignalPolicy>,
    ) -> Self {
        Self {
            coins,
            feed,
            control,
            tracker,
            backend,
            strategies,
            policy,
            scan_interval: SCAN_INTERVAL,
            pause_interval: PAUSE_INTERVAL,
        }
    }

    pub fn with_intervals(mut self, scan: Duration, pause: Duration) -> Self {
        self.scan_interval = scan;
        self.pause_interval = pause;
        self
    }

    /// Run one cycle
    pub async fn tick(&mut self) -> TickOutcome {
        if self.control.bot_state() != BotState::Running {
            tracing::info!("Bot is stopped by the control surface; skipping cycle");
            return TickOutcome::Paused;
        }

        let risk = self.control.risk_settings();

        let in_trade = {
            let mut tracker = self.tracker.lock().await;
            tracker.update_risk(&risk);
            tracker.in_trade()
        };

        let outcome = if in_trade {
            tracing::info!("Active trade open; running exit checks only");
            let mut tracker = self.tracker.lock().await;
            match tracker.check(self.feed.as_ref()).await {
                Ok(closed) => TickOutcome::Checked { closed },
                Err(e) => {
                    tracing::error!("Exit check failed: {}", e);
                    TickOutcome::Checked { closed: None }
                }
            }
        } else {
            self.scan().await
        };

        if let Err(e) = self.tracker.lock().await.flush() {
            tracing::warn!("State flush failed: {}", e);
        }

        outcome
    }

    /// Scan the universe in order; dispatch on the first actionable signal
    async fn scan(&mut self) -> TickOutcome {
        for pair in &self.coins {
            let candles = self.feed.fetch_candles(pair).await;
            if candles.is_empty() {
                tracing::warn!("Skipping {}: no valid candle data", pair);
                continue;
            }

            let signals: Vec<Signal> = self
                .strategies
                .iter()
                .map(|s| s.signal(&candles))
                .collect();
            let action = self.policy.decide(&signals);

            let summary: Vec<String> = self
                .strategies
                .iter()
                .zip(&signals)
                .map(|(s, sig)| format!("{}={:?}", s.name(), sig))
                .collect();
            tracing::info!("{}: {} -> {:?}", pair, summary.join(" "), action);

            let Some(side) = Side::from_signal(action) else {
                continue;
            };
            let Some(price) = latest_close(&candles) else {
                continue;
            };

            let quantity = self.tracker.lock().await.budget() / price;
            let report = self.backend.execute(pair, side, price, quantity).await;
            if report.accepted {
                tracing::info!("Executed {} {}: {}", side, pair, report.detail);
            } else {
                tracing::error!("Execution rejected for {}: {}", pair, report.detail);
            }

            // First match wins; the rest of the universe waits for the next cycle
            return TickOutcome::Entered {
                pair: pair.clone(),
                side,
                accepted: report.accepted,
            };
        }

        TickOutcome::Idle
    }

    /// Delay before the next cycle, shorter while paused
    pub fn delay_for(&self, outcome: &TickOutcome) -> Duration {
        match outcome {
            TickOutcome::Paused => self.pause_interval,
            _ => self.scan_interval,
        }
    }

    /// Drive ticks until the process terminates
    pub async fn run(&mut self) {
        loop {
            let outcome = self.tick().await;
            tokio::time::sleep(self.delay_for(&outcome)).await;
        }
    }
}
