use common::Bar;

use super::{check_period, IndicatorError};

/// Recent support: the lowest low of the trailing `lookback` bars.
/// `None` when fewer than `lookback` bars are available.
pub fn support_level(bars: &[Bar], lookback: usize) -> Result<Option<f64>, IndicatorError> {
    check_period("support lookback", lookback)?;
    if bars.len() < lookback {
        return Ok(None);
    }
    Ok(bars[bars.len() - lookback..]
        .iter()
        .map(|b| b.low)
        .reduce(f64::min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bar;

    #[test]
    fn lowest_low_of_window() {
        let bars = vec![
            bar(0, 5.0, 6.0, 1.0, 5.0, 1.0),
            bar(1, 5.0, 6.0, 4.0, 5.0, 1.0),
            bar(2, 5.0, 6.0, 3.0, 5.0, 1.0),
            bar(3, 5.0, 6.0, 4.5, 5.0, 1.0),
        ];
        assert_eq!(support_level(&bars, 3).unwrap(), Some(3.0));
        assert_eq!(support_level(&bars, 4).unwrap(), Some(1.0));
        assert_eq!(support_level(&bars, 5).unwrap(), None);
    }
}
