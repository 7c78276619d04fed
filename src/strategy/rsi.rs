use super::Strategy;
use crate::indicators::calculate_rsi;
use crate::models::{closes, Candle, Signal};

const RSI_PERIOD: usize = 14;
const OVERSOLD: f64 = 30.0;
const OVERBOUGHT: f64 = 70.0;

/// RSI mean-reversion producer
///
/// Buys oversold markets (RSI below 30) and sells overbought ones (RSI above
/// 70). An undefined RSI, including the all-gains window where the down-move
/// mean is zero, produces no signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RsiStrategy;

impl Strategy for RsiStrategy {
    fn signal(&self, candles: &[Candle]) -> Signal {
        if candles.len() < self.min_candles() {
            return Signal::Hold;
        }

        match calculate_rsi(&closes(candles), RSI_PERIOD) {
            Some(rsi) if rsi < OVERSOLD => Signal::Buy,
            Some(rsi) if rsi > OVERBOUGHT => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    fn name(&self) -> &'static str {
        "RSI"
    }

    fn min_candles(&self) -> usize {
        RSI_PERIOD + 1
    }
}
