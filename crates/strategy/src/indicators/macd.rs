use serde::{Deserialize, Serialize};

use super::{check_order, check_period, ema, ema_of_present, IndicatorError, Series};

/// MACD (Moving Average Convergence/Divergence) periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal),
/// Histogram = MACD − Signal.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd_line: Series,
    pub signal_line: Series,
    pub histogram: Series,
}

/// Compute MACD from close prices (oldest first).
///
/// The MACD line starts at index `slow - 1`; the signal line is the EMA of the
/// present MACD values, so it starts `signal - 1` bars later.
pub fn macd(closes: &[f64], config: MacdConfig) -> Result<MacdSeries, IndicatorError> {
    check_period("MACD fast", config.fast)?;
    check_period("MACD slow", config.slow)?;
    check_period("MACD signal", config.signal)?;
    check_order("MACD fast", config.fast, "MACD slow", config.slow)?;

    let fast = ema(closes, config.fast)?;
    let slow = ema(closes, config.slow)?;

    let macd_line: Series = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal_line = ema_of_present(&macd_line, config.signal)?;
    let histogram: Series = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(MacdSeries {
        macd_line,
        signal_line,
        histogram,
    })
}
