//! Technical indicators over bar and price histories.
//!
//! Every series function returns a vector aligned index-for-index with its
//! input, with `None` for positions that are still inside the warm-up window.
//! Insufficient history is never an error; only a broken period contract is.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod crossover;
pub mod divergence;
pub mod levels;
pub mod macd;
pub mod moving_average;
pub mod obv;
pub mod rsi;
pub mod stochastic;

pub use adx::{adx, AdxSeries};
pub use atr::{atr, true_range};
pub use bollinger::{bollinger_bands, bollinger_bandwidth, BollingerBands};
pub use crossover::{detect_ema_cross, EmaCross};
pub use divergence::{detect_bullish_divergence, detect_hidden_bullish_divergence};
pub use levels::support_level;
pub use macd::{macd, MacdConfig, MacdSeries};
pub use moving_average::{ema, ema_of_present, sma, sma_of_present};
pub use obv::obv;
pub use rsi::rsi;
pub use stochastic::{stochastic_rsi, stochastic_rsi_smoothed, StochRsi};

use thiserror::Error;

/// An indicator series aligned with its input. `None` marks warm-up.
pub type Series = Vec<Option<f64>>;

/// Largest look-back any indicator accepts.
pub const MAX_PERIOD: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("{name} period must be within 1..={max}, got {period}")]
    InvalidPeriod {
        name: &'static str,
        period: usize,
        max: usize,
    },

    #[error("{fast_name} period ({fast}) must be shorter than {slow_name} period ({slow})")]
    InvalidPeriodOrder {
        fast_name: &'static str,
        fast: usize,
        slow_name: &'static str,
        slow: usize,
    },
}

pub(crate) fn check_period(name: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 || period > MAX_PERIOD {
        return Err(IndicatorError::InvalidPeriod {
            name,
            period,
            max: MAX_PERIOD,
        });
    }
    Ok(())
}

pub(crate) fn check_order(
    fast_name: &'static str,
    fast: usize,
    slow_name: &'static str,
    slow: usize,
) -> Result<(), IndicatorError> {
    if fast >= slow {
        return Err(IndicatorError::InvalidPeriodOrder {
            fast_name,
            fast,
            slow_name,
            slow,
        });
    }
    Ok(())
}

/// Last element of a series, flattened.
pub fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Element `back` positions before the last one (`back == 0` is the last).
pub fn nth_back(series: &[Option<f64>], back: usize) -> Option<f64> {
    let len = series.len();
    if back >= len {
        return None;
    }
    series[len - 1 - back]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_bounds() {
        assert!(check_period("SMA", 0).is_err());
        assert!(check_period("SMA", MAX_PERIOD + 1).is_err());
        assert!(check_period("SMA", 1).is_ok());
        assert!(check_period("SMA", MAX_PERIOD).is_ok());
    }

    #[test]
    fn order_check() {
        assert!(check_order("fast", 26, "slow", 12).is_err());
        assert!(check_order("fast", 12, "slow", 12).is_err());
        assert!(check_order("fast", 12, "slow", 26).is_ok());
    }

    #[test]
    fn series_accessors() {
        let s = vec![None, Some(1.0), Some(2.0)];
        assert_eq!(last(&s), Some(2.0));
        assert_eq!(nth_back(&s, 1), Some(1.0));
        assert_eq!(nth_back(&s, 2), None);
        assert_eq!(nth_back(&s, 3), None);
        assert_eq!(last(&[]), None);
    }
}
