use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{last_bar, volume_average};
use crate::indicators::{atr, bollinger_bands, bollinger_bandwidth, last};
use crate::{Strategy, StrategyError, StrategyParams};

/// Catches the first expansion out of a Bollinger squeeze, confirmed by ATR,
/// volume and a strong bullish candle.
pub struct BreakoutHunter;

const MIN_BARS: usize = 50;
const BB_STD_DEV: f64 = 2.0;
const VOLUME_SMA_PERIOD: usize = 20;

struct Config {
    bb_period: usize,
    atr_period: usize,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            bb_period: params.get_or("BbPeriod", 20),
            atr_period: params.get_or("AtrPeriod", 14),
        }
    }
}

impl Strategy for BreakoutHunter {
    fn id(&self) -> &'static str {
        "strategy-breakout-hunter"
    }

    fn name(&self) -> &'static str {
        "Breakout Hunter"
    }

    fn description(&self) -> &'static str {
        "Finds breakouts after consolidation: Bollinger squeeze, ATR expansion, upper band break and volume. Target 15%, stop 6%."
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
            DecisionResult::none("Holding breakout position")
        } else if score.value() >= 75.0 {
            DecisionResult::buy("Breakout from consolidation")
                .with_target(price * 1.15)
                .with_stop(price * 0.94)
        } else {
            DecisionResult::none("No breakout signal")
        };
        Ok(decision.with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let bar = last_bar(bars)?;

        let bands = bollinger_bands(&prices, cfg.bb_period, BB_STD_DEV)?;
        let bandwidth = bollinger_bandwidth(&prices, cfg.bb_period, BB_STD_DEV)?;
        let atr_series = atr(bars, cfg.atr_period)?;

        let (Some(bw_now), Some(atr_now), Some(upper), Some(volume_avg)) = (
            last(&bandwidth),
            last(&atr_series),
            last(&bands.upper),
            volume_average(bars, VOLUME_SMA_PERIOD)?,
        ) else {
            return Ok(Score::ZERO);
        };

        let mut score: f64 = 0.0;

        // Squeeze, or the first widening out of one
        if let Some(prev_bw) = preceding_mean(&bandwidth).filter(|v| *v > 0.0) {
            if bw_now / prev_bw > 1.3 && bw_now < 8.0 {
                score += 25.0;
            } else if bw_now < 4.0 {
                score += 20.0;
            } else if bw_now < 6.0 {
                score += 15.0;
            } else if bw_now < 8.0 {
                score += 10.0;
            }
        }

        if let Some(prev_atr) = preceding_mean(&atr_series).filter(|v| *v > 0.0) {
            let ratio = atr_now / prev_atr;
            if ratio >= 1.5 {
                score += 20.0;
            } else if ratio >= 1.3 {
                score += 15.0;
            } else if ratio >= 1.1 {
                score += 10.0;
            }
        }

        if bar.close > upper {
            score += 25.0;
        } else if last(&bands.middle).is_some_and(|middle| bar.close > middle) {
            let distance = (upper - bar.close) / bar.close * 100.0;
            score += if distance < 1.0 {
                20.0
            } else if distance < 2.0 {
                15.0
            } else {
                10.0
            };
        }

        if volume_avg > 0.0 {
            let ratio = bar.volume / volume_avg;
            if ratio >= 2.0 {
                score += 20.0;
            } else if ratio >= 1.5 {
                score += 15.0;
            } else if ratio >= 1.2 {
                score += 10.0;
            }
        }

        // Strong bullish body
        if bar.is_green() && bar.range() > 0.0 {
            let body = (bar.close - bar.open) / bar.range();
            if body > 0.7 {
                score += 10.0;
            } else if body > 0.5 {
                score += 7.0;
            } else if body > 0.3 {
                score += 5.0;
            }
        }

        Ok(Score::new(score.min(100.0)))
    }
}

/// Mean of the four values before the last one, counting warm-up gaps as
/// zero.
fn preceding_mean(series: &[Option<f64>]) -> Option<f64> {
    let n = series.len();
    if n < 5 {
        return None;
    }
    Some(series[n - 5..n - 1].iter().map(|v| v.unwrap_or(0.0)).sum::<f64>() / 4.0)
}
