use super::{check_period, rsi, sma_of_present, IndicatorError, Series};

/// Stochastic RSI lines.
#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    /// %K: raw stochastic of RSI, smoothed.
    pub k: Series,
    /// %D: SMA of %K.
    pub d: Series,
}

/// Stochastic RSI with the standard 3/3 smoothing.
pub fn stochastic_rsi(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
) -> Result<StochRsi, IndicatorError> {
    stochastic_rsi_smoothed(closes, rsi_period, stoch_period, 3, 3)
}

/// Stochastic RSI. Raw %K is where the current RSI sits inside the range of
/// the last `stoch_period` RSI values (50 when the range is flat); %K is then
/// the SMA(`smooth_k`) of raw %K and %D the SMA(`smooth_d`) of %K.
pub fn stochastic_rsi_smoothed(
    closes: &[f64],
    rsi_period: usize,
    stoch_period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> Result<StochRsi, IndicatorError> {
    check_period("StochRSI", stoch_period)?;
    check_period("StochRSI %K smoothing", smooth_k)?;
    check_period("StochRSI %D smoothing", smooth_d)?;
    let rsi_values = rsi(closes, rsi_period)?;

    let mut raw_k: Series = vec![None; closes.len()];
    for i in (stoch_period - 1)..rsi_values.len() {
        let Some(current) = rsi_values[i] else { continue };
        let window = &rsi_values[i + 1 - stoch_period..=i];
        if window.iter().any(Option::is_none) {
            continue;
        }
        let (lo, hi) = window
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        raw_k[i] = Some(if hi == lo {
            50.0
        } else {
            (current - lo) / (hi - lo) * 100.0
        });
    }

    let k = sma_of_present(&raw_k, smooth_k)?;
    let d = sma_of_present(&k, smooth_d)?;
    Ok(StochRsi { k, d })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_rsi_range_reads_neutral() {
        // Strictly rising closes keep RSI pinned at 100.
        let closes: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let out = stochastic_rsi(&closes, 5, 5).unwrap();
        assert_eq!(out.k.last().copied().flatten(), Some(50.0));
        assert_eq!(out.d.last().copied().flatten(), Some(50.0));
    }

    #[test]
    fn warmup_alignment() {
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + (i as f64 * 0.7).sin()).collect();
        let out = stochastic_rsi(&closes, 14, 14).unwrap();
        // RSI from 14, raw %K from 27, %K from 29, %D from 31
        assert!(out.k[28].is_none());
        assert!(out.k[29].is_some());
        assert!(out.d[30].is_none());
        assert!(out.d[31].is_some());
        for v in out.k.iter().flatten().chain(out.d.iter().flatten()) {
            assert!((0.0..=100.0).contains(v), "StochRSI out of range: {v}");
        }
    }

    #[test]
    fn rejects_zero_smoothing() {
        assert!(stochastic_rsi_smoothed(&[1.0; 10], 3, 3, 0, 3).is_err());
    }
}
