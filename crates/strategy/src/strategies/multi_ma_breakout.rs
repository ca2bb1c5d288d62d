use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{ensure_bars, last_bar};
use crate::indicators::{ema, last, sma, Series};
use crate::{Strategy, StrategyError, StrategyParams};

/// Scanner for prices above any of a selectable set of moving averages.
pub struct MultiMaBreakout;

/// Flag, label, period, exponential, enabled by default.
const AVERAGES: [(&str, &str, usize, bool, bool); 6] = [
    ("use_sma13", "SMA 13", 13, false, false),
    ("use_ema21", "EMA 21", 21, true, false),
    ("use_sma50", "SMA 50", 50, false, false),
    ("use_sma111", "SMA 111", 111, false, true),
    ("use_sma200", "SMA 200", 200, false, false),
    ("use_sma350", "SMA 350", 350, false, false),
];

/// Score lost per bar since the breakout, for up to this many bars.
const DECAY_PER_BAR: f64 = 2.0;
const MAX_DECAY_BARS: usize = 15;
const ESTABLISHED_TREND_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy)]
struct MovingAverage {
    label: &'static str,
    period: usize,
    exponential: bool,
}

impl MovingAverage {
    fn series(&self, prices: &[f64]) -> Result<Series, StrategyError> {
        let series = if self.exponential {
            ema(prices, self.period)?
        } else {
            sma(prices, self.period)?
        };
        Ok(series)
    }
}

fn enabled(params: &StrategyParams) -> Vec<MovingAverage> {
    AVERAGES
        .iter()
        .filter(|(flag, _, _, _, default)| params.flag(flag, *default))
        .map(|&(_, label, period, exponential, _)| MovingAverage {
            label,
            period,
            exponential,
        })
        .collect()
}

fn longest_period(averages: &[MovingAverage]) -> Option<usize> {
    averages.iter().map(|ma| ma.period).max()
}

impl Strategy for MultiMaBreakout {
    fn id(&self) -> &'static str {
        "BistMultiMaBreakoutStrategy"
    }

    fn name(&self) -> &'static str {
        "Multi-MA Breakout Scanner"
    }

    fn description(&self) -> &'static str {
        "Scans for prices trading above the selected moving averages (SMA 13, EMA 21, SMA 50, SMA 111, SMA 200, SMA 350). SMA 111 is on unless disabled."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Scanner
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        longest_period(&enabled(params)).unwrap_or(1)
    }

    fn min_score_bars(&self, params: &StrategyParams) -> usize {
        longest_period(&enabled(params)).map_or(1, |p| p.saturating_add(1))
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let averages = enabled(params);
        let Some(longest) = longest_period(&averages) else {
            return Ok(DecisionResult::none("No moving average selected"));
        };
        ensure_bars(bars, longest)?;

        let prices = closes(bars);
        let price = last_bar(bars)?.close;
        let mut values = Vec::with_capacity(averages.len());
        let mut above = Vec::new();
        for ma in &averages {
            let Some(value) = last(&ma.series(&prices)?) else {
                continue;
            };
            values.push((ma.label, value));
            if price > value {
                above.push(ma.label);
            }
        }

        let decision = match (above.is_empty(), position.is_flat()) {
            (false, true) => DecisionResult::buy(format!("Price above {}", above.join(", "))),
            (false, false) => DecisionResult::none(format!("Trend continues ({})", above.join(", "))),
            (true, false) => DecisionResult::sell("Price below every selected average"),
            (true, true) => DecisionResult::none("Price below every selected average"),
        };
        Ok(values
            .into_iter()
            .fold(decision, |d, (label, value)| d.with_indicator(label, value)))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let averages = enabled(params);
        let Some(longest) = longest_period(&averages) else {
            return Ok(Score::ZERO);
        };
        ensure_bars(bars, longest.saturating_add(1))?;

        let prices = closes(bars);
        let price = last_bar(bars)?.close;
        let mut best = 0.0_f64;

        for ma in &averages {
            let series = ma.series(&prices)?;
            match last(&series) {
                Some(value) if price >= value => {}
                _ => continue,
            }

            // Walk back to the last close under this average
            let mut since_breakout = 0usize;
            let mut found = false;
            for i in (longest - 1..=prices.len() - 2).rev() {
                match series[i] {
                    Some(avg) if prices[i] < avg => {
                        found = true;
                        break;
                    }
                    Some(_) => since_breakout += 1,
                    None => break,
                }
            }

            let score = if found {
                100.0 - since_breakout.min(MAX_DECAY_BARS) as f64 * DECAY_PER_BAR
            } else {
                ESTABLISHED_TREND_SCORE
            };
            best = best.max(score);
        }

        Ok(Score::new(best))
    }
}
