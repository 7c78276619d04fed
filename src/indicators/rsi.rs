/// Calculate Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Returns `None` when fewer than `period + 1` closes are available, or when
/// the trailing window has no down-moves at all: the relative strength ratio
/// is undefined there.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &deltas[deltas.len() - period..];

    let avg_gain: f64 = window.iter().filter(|&&d| d > 0.0).sum::<f64>() / period as f64;
    let avg_loss: f64 = window.iter().filter(|&&d| d < 0.0).map(|d| -d).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return None;
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
