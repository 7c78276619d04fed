/// Highest value of the trailing `window` entries
pub fn rolling_high(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }

    let high = values[values.len() - window..]
        .iter()
        .copied()
        .fold(f64::MIN, f64::max);
    Some(high)
}

/// Lowest value of the trailing `window` entries
pub fn rolling_low(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }

    let low = values[values.len() - window..]
        .iter()
        .copied()
        .fold(f64::MAX, f64::min);
    Some(low)
}
