use super::{check_period, IndicatorError, Series};

/// Simple moving average. The first `period - 1` entries are `None`.
pub fn sma(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("SMA", period)?;
    let mut out = vec![None; values.len()];
    if values.len() < period {
        return Ok(out);
    }
    for (offset, window) in values.windows(period).enumerate() {
        out[offset + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    Ok(out)
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values and smoothed with `k = 2 / (period + 1)` afterwards.
pub fn ema(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("EMA", period)?;
    let mut out = vec![None; values.len()];
    if values.len() < period {
        return Ok(out);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(current);

    for (i, &value) in values.iter().enumerate().skip(period) {
        current = value * k + current * (1.0 - k);
        out[i] = Some(current);
    }
    Ok(out)
}

/// EMA over the present values of a series, re-aligned to the series.
pub fn ema_of_present(series: &[Option<f64>], period: usize) -> Result<Series, IndicatorError> {
    over_present(series, period, ema)
}

/// SMA over the present values of a series, re-aligned to the series.
pub fn sma_of_present(series: &[Option<f64>], period: usize) -> Result<Series, IndicatorError> {
    over_present(series, period, sma)
}

fn over_present(
    series: &[Option<f64>],
    period: usize,
    f: fn(&[f64], usize) -> Result<Series, IndicatorError>,
) -> Result<Series, IndicatorError> {
    let (indices, values): (Vec<usize>, Vec<f64>) = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let inner = f(&values, period)?;
    let mut out = vec![None; series.len()];
    for (idx, value) in indices.into_iter().zip(inner) {
        out[idx] = value;
    }
    Ok(out)
}
