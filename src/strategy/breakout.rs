use super::Strategy;
use crate::indicators::{rolling_high, rolling_low};
use crate::models::{Candle, Signal};

const RANGE_PERIOD: usize = 7;

/// Range-breakout producer
///
/// Compares the latest close against the 7-bar high/low ending at the
/// second-to-last bar. The reference window excludes the current bar, so a
/// new extreme is never compared against itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutStrategy;

impl Strategy for BreakoutStrategy {
    fn signal(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles() {
            return Signal::Hold;
        }

        let reference = &candles[..candles.len() - 1];
        let highs: Vec<f64> = reference.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = reference.iter().map(|c| c.low).collect();

        let (Some(range_high), Some(range_low)) = (
            rolling_high(&highs, RANGE_PERIOD),
            rolling_low(&lows, RANGE_PERIOD),
        ) else {
            return Signal::Hold;
        };

        let price = match candles.last() {
            Some(candle) => candle.close,
            None => return Signal::Hold,
        };

        if price > range_high {
            Signal::Buy
        } else if price < range_low {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "Breakout"
    }

    fn min_candles(&self) -> usize {
        RANGE_PERIOD + 1
    }
}
