// Trading strategy module
pub mod aggregate;
pub mod breakout;
pub mod rsi;
pub mod sma_crossover;

pub use aggregate::{MajorityVote, SignalPolicy, Unanimous};
pub use breakout::BreakoutStrategy;
pub use rsi::RsiStrategy;
pub use sma_crossover::SmaCrossoverStrategy;

use crate::models::{Candle, Signal};

/// Base trait for all signal producers
///
/// Producers are pure over the candle series and never fail: a series shorter
/// than `min_candles`, or an indicator whose value is undefined at the needed
/// offset, yields `Signal::Hold`.
pub trait Strategy: Send + Sync {
    /// Generate a trading signal based on market data
    fn signal(&self, candles: &[Candle]) -> Signal;

    /// Get strategy name
    fn name(&self) -> &'static str;

    /// Minimum candles required for this strategy
    fn min_candles(&self) -> usize;
}

/// The stock producer set scanned on every cycle
pub fn default_strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(RsiStrategy),
        Box::new(SmaCrossoverStrategy),
        Box::new(BreakoutStrategy),
    ]
}
