use common::Bar;

use super::{check_period, IndicatorError, Series};

/// True range per bar. The first bar has no previous close, so its range is
/// `high - low`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let high_low = bar.high - bar.low;
            if i == 0 {
                return high_low;
            }
            let prev_close = bars[i - 1].close;
            high_low
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

/// Average true range with Wilder smoothing. The seed at index `period - 1`
/// is the mean of the first `period` true ranges.
pub fn atr(bars: &[Bar], period: usize) -> Result<Series, IndicatorError> {
    check_period("ATR", period)?;
    let mut out = vec![None; bars.len()];
    if bars.len() < period {
        return Ok(out);
    }

    let tr = true_range(bars);
    let p = period as f64;
    let mut current = tr[..period].iter().sum::<f64>() / p;
    out[period - 1] = Some(current);
    for i in period..tr.len() {
        current = (current * (p - 1.0) + tr[i]) / p;
        out[i] = Some(current);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bar;

    #[test]
    fn true_range_uses_previous_close() {
        let bars = vec![bar(0, 10.0, 12.0, 9.0, 11.0, 1.0), bar(1, 15.0, 16.0, 14.0, 15.0, 1.0)];
        let tr = true_range(&bars);
        assert_eq!(tr, vec![3.0, 5.0]);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let bars = vec![
            bar(0, 10.0, 11.0, 9.0, 10.0, 1.0), // tr 2
            bar(1, 10.0, 12.0, 10.0, 11.0, 1.0), // tr 2
            bar(2, 11.0, 15.0, 11.0, 14.0, 1.0), // tr 4
        ];
        let out = atr(&bars, 2).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], Some(2.0));
        assert_eq!(out[2], Some(3.0));
    }

    #[test]
    fn atr_short_history() {
        let bars = vec![bar(0, 1.0, 2.0, 0.5, 1.5, 1.0)];
        assert_eq!(atr(&bars, 14).unwrap(), vec![None]);
    }
}
