use super::Strategy;
use crate::indicators::calculate_sma;
use crate::models::{closes, Candle, Signal};

const SHORT_PERIOD: usize = 10;
const LONG_PERIOD: usize = 30;

/// Moving-average crossover producer
///
/// Compares the 10-bar and 30-bar simple moving averages at the last two bars
/// and signals only on the bar where they actually cross.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmaCrossoverStrategy;

impl Strategy for SmaCrossoverStrategy {
    fn signal(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles() {
            return Signal::Hold;
        }

        let closes = closes(candles);
        let previous = &closes[..closes.len() - 1];

        let (Some(short_now), Some(long_now)) = (
            calculate_sma(&closes, SHORT_PERIOD),
            calculate_sma(&closes, LONG_PERIOD),
        ) else {
            return Signal::Hold;
        };
        let (Some(short_prev), Some(long_prev)) = (
            calculate_sma(previous, SHORT_PERIOD),
            calculate_sma(previous, LONG_PERIOD),
        ) else {
            return Signal::Hold;
        };

        if short_prev < long_prev && short_now > long_now {
            Signal::Buy
        } else if short_prev > long_prev && short_now < long_now {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    fn name(&self) -> &'static str {
        "SMA"
    }

    fn min_candles(&self) -> usize {
        LONG_PERIOD + 1
    }
}
