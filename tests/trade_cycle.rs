//! End-to-end paper trading cycle over injected collaborators: scan the
//! universe, enter on the first actionable signal, ride the position, close
//! on stop-loss, and verify the ledger trail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::Mutex;

use multibot::engine::{TickOutcome, TradeLoop};
use multibot::execution::{PaperExecution, PositionTracker};
use multibot::market::CandleFeed;
use multibot::models::{BotState, Candle, RiskSettings, Side, TradeReason};
use multibot::store::{ControlSurface, MemoryLedger};
use multibot::strategy::{default_strategies, MajorityVote};

struct TestControl {
    state: StdMutex<BotState>,
}

impl TestControl {
    fn running() -> Arc<Self> {
        Arc::new(Self {
            state: StdMutex::new(BotState::Running),
        })
    }
}

/// Shared handle so the test can mutate control state after handing a clone
/// to the trade loop; newtype works around the orphan rule for `Arc<T>`.
struct SharedControl(Arc<TestControl>);

impl ControlSurface for SharedControl {
    fn bot_state(&self) -> BotState {
        *self.0.state.lock().unwrap()
    }

    fn risk_settings(&self) -> RiskSettings {
        RiskSettings::default()
    }
}

struct TestFeed {
    series: StdMutex<HashMap<String, Vec<Candle>>>,
    calls: AtomicUsize,
}

impl TestFeed {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            series: StdMutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    fn set(&self, pair: &str, candles: Vec<Candle>) {
        self.series
            .lock()
            .unwrap()
            .insert(pair.to_string(), candles);
    }
}

/// Shared feed handle; newtype works around the orphan rule for `Arc<T>`.
struct SharedFeed(Arc<TestFeed>);

#[async_trait]
impl CandleFeed for SharedFeed {
    async fn fetch_candles(&self, pair: &str) -> Vec<Candle> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        self.0
            .series
            .lock()
            .unwrap()
            .get(pair)
            .cloned()
            .unwrap_or_default()
    }
}

fn candle(pair: &str, high: f64, low: f64, close: f64, index: usize) -> Candle {
    Candle {
        pair: pair.to_string(),
        timestamp: Utc::now() + ChronoDuration::minutes(15 * index as i64),
        open: close,
        high,
        low,
        close,
        volume: 1000.0,
    }
}

/// Eight bars whose last close breaks the prior 7-bar high
fn breakout_series(pair: &str, entry_price: f64) -> Vec<Candle> {
    let high = entry_price - 1.0;
    let low = entry_price - 10.0;
    let mut candles: Vec<Candle> = (0..7)
        .map(|i| candle(pair, high, low, entry_price - 5.0, i))
        .collect();
    candles.push(candle(pair, entry_price, low, entry_price, 7));
    candles
}

#[tokio::test]
async fn test_full_paper_trade_cycle() {
    let control = TestControl::running();
    let feed = TestFeed::new();
    let tracker = Arc::new(Mutex::new(PositionTracker::new(
        &RiskSettings::default(),
        Box::new(MemoryLedger::new()),
    )));
    let backend = Box::new(PaperExecution::new(tracker.clone()));

    let mut trade_loop = TradeLoop::new(
        vec!["ETH-INR".to_string(), "SOL-INR".to_string()],
        Arc::new(SharedFeed(feed.clone())),
        Box::new(SharedControl(control.clone())),
        tracker.clone(),
        backend,
        default_strategies(),
        Box::new(MajorityVote),
    );

    // Cycle 1: ETH-INR has no data, SOL-INR breaks out at 100
    feed.set("SOL-INR", breakout_series("SOL-INR", 100.0));
    let outcome = trade_loop.tick().await;
    assert_eq!(
        outcome,
        TickOutcome::Entered {
            pair: "SOL-INR".to_string(),
            side: Side::Buy,
            accepted: true,
        }
    );

    {
        let tracker = tracker.lock().await;
        let position = tracker.active_position().unwrap();
        assert_eq!(position.pair, "SOL-INR");
        assert_eq!(position.quantity, 10.0);
        assert_eq!(position.stop_loss, 97.0);
        assert_eq!(position.take_profit, 105.0);
        // Opening does not spend the budget
        assert_eq!(tracker.budget(), 1000.0);
    }

    // Cycle 2: price holds inside the band, position stays open
    feed.set("SOL-INR", vec![candle("SOL-INR", 101.0, 99.0, 100.5, 0)]);
    let outcome = trade_loop.tick().await;
    assert_eq!(outcome, TickOutcome::Checked { closed: None });
    assert!(tracker.lock().await.in_trade());

    // Cycle 3: price breaches the stop, position closes
    feed.set("SOL-INR", vec![candle("SOL-INR", 96.5, 95.5, 96.0, 0)]);
    let outcome = trade_loop.tick().await;
    assert_eq!(
        outcome,
        TickOutcome::Checked {
            closed: Some(TradeReason::StopLoss)
        }
    );

    let tracker = tracker.lock().await;
    assert!(!tracker.in_trade());
    // pnl = 10 * 96 - 1000 = -40
    assert_eq!(tracker.budget(), 960.0);

    let rows = tracker.ledger().load().unwrap();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].pair, "SOL-INR");
    assert_eq!(rows[0].action, Side::Buy);
    assert_eq!(rows[0].reason, TradeReason::Entry);
    assert_eq!(rows[0].pnl, 0.0);
    assert_eq!(rows[0].balance_after, 1000.0);

    assert_eq!(rows[1].action, Side::Sell);
    assert_eq!(rows[1].reason, TradeReason::StopLoss);
    assert_eq!(rows[1].price, 96.0);
    assert_eq!(rows[1].pnl, -40.0);
    assert_eq!(rows[1].balance_after, 960.0);

    assert!(rows[0].timestamp <= rows[1].timestamp);
}

#[tokio::test]
async fn test_stopped_bot_never_trades() {
    let control = TestControl::running();
    *control.state.lock().unwrap() = BotState::Stopped;

    let feed = TestFeed::new();
    feed.set("SOL-INR", breakout_series("SOL-INR", 100.0));

    let tracker = Arc::new(Mutex::new(PositionTracker::new(
        &RiskSettings::default(),
        Box::new(MemoryLedger::new()),
    )));
    let backend = Box::new(PaperExecution::new(tracker.clone()));

    let mut trade_loop = TradeLoop::new(
        vec!["SOL-INR".to_string()],
        Arc::new(SharedFeed(feed.clone())),
        Box::new(SharedControl(control.clone())),
        tracker.clone(),
        backend,
        default_strategies(),
        Box::new(MajorityVote),
    );

    for _ in 0..3 {
        assert_eq!(trade_loop.tick().await, TickOutcome::Paused);
    }
    assert_eq!(feed.calls.load(Ordering::SeqCst), 0);
    assert!(tracker.lock().await.ledger().load().unwrap().is_empty());

    // Flipping the switch lets the very next cycle trade
    *control.state.lock().unwrap() = BotState::Running;
    let outcome = trade_loop.tick().await;
    assert!(matches!(outcome, TickOutcome::Entered { accepted: true, .. }));
}

#[tokio::test]
async fn test_compounded_budget_sizes_next_entry() {
    let control = TestControl::running();
    let feed = TestFeed::new();
    let tracker = Arc::new(Mutex::new(PositionTracker::new(
        &RiskSettings::default(),
        Box::new(MemoryLedger::new()),
    )));
    let backend = Box::new(PaperExecution::new(tracker.clone()));

    let mut trade_loop = TradeLoop::new(
        vec!["SOL-INR".to_string()],
        Arc::new(SharedFeed(feed.clone())),
        Box::new(SharedControl(control.clone())),
        tracker.clone(),
        backend,
        default_strategies(),
        Box::new(MajorityVote),
    );

    // Enter at 100, take profit at 106: budget 1000 -> 1060
    feed.set("SOL-INR", breakout_series("SOL-INR", 100.0));
    trade_loop.tick().await;
    feed.set("SOL-INR", vec![candle("SOL-INR", 106.5, 105.5, 106.0, 0)]);
    let outcome = trade_loop.tick().await;
    assert_eq!(
        outcome,
        TickOutcome::Checked {
            closed: Some(TradeReason::TakeProfit)
        }
    );
    assert_eq!(tracker.lock().await.budget(), 1060.0);

    // Re-enter at 106: quantity reflects the compounded budget
    feed.set("SOL-INR", breakout_series("SOL-INR", 106.0));
    let outcome = trade_loop.tick().await;
    assert!(matches!(outcome, TickOutcome::Entered { accepted: true, .. }));

    let tracker = tracker.lock().await;
    let position = tracker.active_position().unwrap();
    assert_eq!(position.quantity, 1060.0 / 106.0);

    let rows = tracker.ledger().load().unwrap();
    assert_eq!(rows.len(), 3);
    for pair in rows.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}
