use super::{check_period, IndicatorError, Series};

/// RSI (Relative Strength Index) over close prices, oldest first.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI).
/// The first value appears at index `period`, once `period` price changes are
/// known. An average loss of zero saturates at 100, which includes a perfectly
/// flat series.
pub fn rsi(closes: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("RSI", period)?;
    let mut out = vec![None; closes.len()];
    if closes.len() < period + 1 {
        return Ok(out);
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    // First average gain/loss over the initial `period` changes
    let initial = &changes[..period];
    let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / p;
    let mut avg_loss = initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / p;
    out[period] = Some(value(avg_gain, avg_loss));

    // Wilder smoothing over remaining changes
    for (offset, &change) in changes[period..].iter().enumerate() {
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[period + 1 + offset] = Some(value(avg_gain, avg_loss));
    }

    Ok(out)
}

fn value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
