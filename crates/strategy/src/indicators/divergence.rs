use common::Bar;

use super::{check_period, IndicatorError};

/// Minimum number of present oscillator values inside the window.
const MIN_OSCILLATOR_POINTS: usize = 5;

/// Regular bullish divergence over the last `lookback` bars: price prints a
/// lower low in the second half of the window while the oscillator prints a
/// higher low.
pub fn detect_bullish_divergence(
    bars: &[Bar],
    oscillator: &[Option<f64>],
    lookback: usize,
) -> Result<bool, IndicatorError> {
    Ok(half_lows(bars, oscillator, lookback)?
        .is_some_and(|h| h.price_second < h.price_first && h.osc_second > h.osc_first))
}

/// Hidden bullish divergence: price makes a higher low while the oscillator
/// makes a lower low.
pub fn detect_hidden_bullish_divergence(
    bars: &[Bar],
    oscillator: &[Option<f64>],
    lookback: usize,
) -> Result<bool, IndicatorError> {
    Ok(half_lows(bars, oscillator, lookback)?
        .is_some_and(|h| h.price_second > h.price_first && h.osc_second < h.osc_first))
}

struct HalfLows {
    price_first: f64,
    price_second: f64,
    osc_first: f64,
    osc_second: f64,
}

/// Splits the trailing window in two halves and takes the minimum of each.
/// Price halves split the bars; oscillator halves split the present values.
fn half_lows(
    bars: &[Bar],
    oscillator: &[Option<f64>],
    lookback: usize,
) -> Result<Option<HalfLows>, IndicatorError> {
    check_period("divergence lookback", lookback)?;
    if bars.len() < lookback || oscillator.len() < lookback {
        return Ok(None);
    }

    let recent_bars = &bars[bars.len() - lookback..];
    let recent_osc: Vec<f64> = oscillator[oscillator.len() - lookback..]
        .iter()
        .flatten()
        .copied()
        .collect();
    if recent_osc.len() < MIN_OSCILLATOR_POINTS {
        return Ok(None);
    }

    let (bars_first, bars_second) = recent_bars.split_at(recent_bars.len() / 2);
    let (osc_first, osc_second) = recent_osc.split_at(recent_osc.len() / 2);
    let (Some(price_first), Some(price_second), Some(osc_first), Some(osc_second)) = (
        min_of(bars_first.iter().map(|b| b.low)),
        min_of(bars_second.iter().map(|b| b.low)),
        min_of(osc_first.iter().copied()),
        min_of(osc_second.iter().copied()),
    ) else {
        return Ok(None);
    };

    Ok(Some(HalfLows {
        price_first,
        price_second,
        osc_first,
        osc_second,
    }))
}

fn min_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.reduce(f64::min)
}
