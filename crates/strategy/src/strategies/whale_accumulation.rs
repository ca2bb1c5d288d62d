use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{last_bar, volume_average};
use crate::indicators::{bollinger_bandwidth, last, obv, sma};
use crate::{Strategy, StrategyError, StrategyParams};

/// Looks for quiet accumulation: rising OBV inside a tight Bollinger squeeze
/// with a narrow price range and unremarkable volume.
pub struct WhaleAccumulation;

const MIN_BARS: usize = 50;
const BB_STD_DEV: f64 = 2.0;
const RANGE_WINDOW: usize = 10;
const OBV_TREND_WINDOW: usize = 5;

struct Config {
    obv_sma_period: usize,
    bb_period: usize,
    squeeze_threshold: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            obv_sma_period: params.get_or("ObvSmaPeriod", 20),
            bb_period: params.get_or("BbPeriod", 20),
            squeeze_threshold: params.get_or("SqueezeThreshold", 5.0),
        }
    }
}

impl Strategy for WhaleAccumulation {
    fn id(&self) -> &'static str {
        "strategy-whale-accumulation"
    }

    fn name(&self) -> &'static str {
        "Whale Accumulation"
    }

    fn description(&self) -> &'static str {
        "Detects accumulation by large holders: rising OBV while price moves sideways inside a Bollinger squeeze. Target 15%, stop 7%."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Scanner
    }

    fn min_bars(&self, _params: &StrategyParams) -> usize {
        MIN_BARS
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let price = last_bar(bars)?.close;
        let score = self.score(bars, params)?;

        let decision = if !position.is_flat() {
            DecisionResult::none("Holding accumulation position")
        } else if score.value() >= 75.0 {
            DecisionResult::buy("Whale accumulation signal: OBV rising inside a squeeze")
                .with_target(price * 1.15)
                .with_stop(price * 0.93)
        } else {
            DecisionResult::none("No accumulation pattern")
        };
        Ok(decision.with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let bar = last_bar(bars)?;

        let obv_line = obv(bars);
        let obv_sma = last(&sma(&obv_line, cfg.obv_sma_period)?);
        let bandwidth = last(&bollinger_bandwidth(&prices, cfg.bb_period, BB_STD_DEV)?);
        let volume_avg = volume_average(bars, cfg.obv_sma_period)?;
        let (Some(obv_sma), Some(bandwidth), Some(volume_avg)) = (obv_sma, bandwidth, volume_avg)
        else {
            return Ok(Score::ZERO);
        };
        let last_obv = obv_line.last().copied().unwrap_or_default();

        let mut score: f64 = 0.0;

        // Squeeze
        if bandwidth < 3.0 {
            score += 35.0;
        } else if bandwidth < cfg.squeeze_threshold {
            score += 30.0;
        } else if bandwidth < 7.0 {
            score += 20.0;
        } else if bandwidth < 10.0 {
            score += 10.0;
        }

        if last_obv > obv_sma {
            let trend = obv_trend(&obv_line);
            score += if trend > 5.0 {
                35.0
            } else if trend > 2.0 {
                28.0
            } else if trend > 0.0 {
                20.0
            } else {
                10.0
            };
        }

        let range = range_percent(&bars[bars.len().saturating_sub(RANGE_WINDOW)..]);
        if range < 3.0 {
            score += 15.0;
        } else if range < 5.0 {
            score += 12.0;
        } else if range < 8.0 {
            score += 8.0;
        }

        // Accumulation happens on ordinary volume, not spikes
        if volume_avg > 0.0 {
            let ratio = bar.volume / volume_avg;
            if (0.6..=1.2).contains(&ratio) {
                score += 15.0;
            } else if ratio > 1.2 && ratio <= 1.5 {
                score += 10.0;
            } else if ratio < 0.6 {
                score += 8.0;
            }
        }

        Ok(Score::new(score.min(100.0)))
    }
}

/// Mean of the last five OBV values against the five before, in percent.
fn obv_trend(obv_line: &[f64]) -> f64 {
    let n = obv_line.len();
    if n < OBV_TREND_WINDOW * 2 {
        return 0.0;
    }
    let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
    let recent = mean(&obv_line[n - OBV_TREND_WINDOW..]);
    let previous = mean(&obv_line[n - 2 * OBV_TREND_WINDOW..n - OBV_TREND_WINDOW]);
    if previous == 0.0 {
        return 0.0;
    }
    (recent - previous) / previous.abs() * 100.0
}

/// High-to-low span of the window relative to its low, in percent.
fn range_percent(window: &[Bar]) -> f64 {
    let high = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    if low <= 0.0 {
        return 100.0;
    }
    (high - low) / low * 100.0
}
