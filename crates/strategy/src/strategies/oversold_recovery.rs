use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{last_bar, volume_average};
use crate::indicators::{
    detect_bullish_divergence, last, nth_back, rsi, stochastic_rsi, support_level,
};
use crate::{Strategy, StrategyError, StrategyParams};

/// Buys the turn out of oversold territory near support.
pub struct OversoldRecovery;

const MIN_BARS: usize = 50;
const VOLUME_SMA_PERIOD: usize = 20;
const SUPPORT_LOOKBACK: usize = 20;
const DIVERGENCE_LOOKBACK: usize = 10;

struct Config {
    rsi_period: usize,
    stoch_rsi_period: usize,
    oversold_level: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            rsi_period: params.get_or("RsiPeriod", 14),
            stoch_rsi_period: params.get_or("StochRsiPeriod", 14),
            oversold_level: params.get_or("OversoldLevel", 30.0),
        }
    }
}

impl Strategy for OversoldRecovery {
    fn id(&self) -> &'static str {
        "strategy-oversold-recovery"
    }

    fn name(&self) -> &'static str {
        "Oversold Recovery"
    }

    fn description(&self) -> &'static str {
        "Finds coins recovering from oversold RSI and Stochastic RSI near support with rising volume. Exits when RSI normalizes with profit or the recovery fails. Target 12%, stop 5%."
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
        let cfg = Config::from(params);
        let price = last_bar(bars)?.close;

        if let Some(pnl) = position.pnl_percent(price).filter(|_| !position.is_flat()) {
            let rsi_now = last(&rsi(&closes(bars), cfg.rsi_period)?).unwrap_or(50.0);
            let decision = if pnl >= 12.0 {
                DecisionResult::sell(format!("Recovery complete, take profit ({pnl:.2}%)"))
            } else if rsi_now > 65.0 && pnl > 5.0 {
                DecisionResult::sell(format!("RSI normalized ({rsi_now:.0}), taking profit ({pnl:.2}%)"))
            } else if rsi_now < 20.0 && pnl <= -5.0 {
                DecisionResult::sell(format!(
                    "Recovery failed, RSI {rsi_now:.0} ({:.2}% loss)",
                    pnl.abs()
                ))
            } else if pnl <= -5.0 {
                DecisionResult::sell(format!("Stop loss ({:.2}% loss)", pnl.abs()))
            } else {
                DecisionResult::none(format!("Holding recovery: {pnl:.2}% (RSI {rsi_now:.0})"))
            };
            return Ok(decision.with_indicator("RSI", rsi_now));
        }

        let score = self.score(bars, params)?;
        let decision = if position.is_flat() && score.value() >= 70.0 {
            DecisionResult::buy("Recovering from oversold")
                .with_target(price * 1.12)
                .with_stop(price * 0.95)
        } else {
            DecisionResult::none("No recovery signal")
        };
        Ok(decision.with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let close = last_bar(bars)?.close;

        let rsi_series = rsi(&prices, cfg.rsi_period)?;
        let stoch = stochastic_rsi(&prices, cfg.rsi_period, cfg.stoch_rsi_period)?;
        let (Some(rsi_now), Some(k_now), Some(volume_avg), Some(support)) = (
            last(&rsi_series),
            last(&stoch.k),
            volume_average(bars, VOLUME_SMA_PERIOD)?,
            support_level(bars, SUPPORT_LOOKBACK)?,
        ) else {
            return Ok(Score::ZERO);
        };

        let mut score: f64 = 0.0;

        match nth_back(&rsi_series, 1) {
            Some(prev) if prev <= cfg.oversold_level && rsi_now > prev => {
                score += if rsi_now <= 40.0 {
                    30.0
                } else if rsi_now <= 50.0 {
                    25.0
                } else {
                    15.0
                };
            }
            _ if rsi_now <= cfg.oversold_level => score += 10.0,
            _ => {}
        }

        if let Some(prev_k) = nth_back(&stoch.k, 1).filter(|prev| k_now > *prev) {
            score += if prev_k <= 20.0 && k_now > 20.0 {
                25.0
            } else if k_now <= 30.0 {
                20.0
            } else {
                10.0
            };
        }

        let distance = if support > 0.0 {
            (close - support) / support * 100.0
        } else {
            100.0
        };
        if (0.0..=2.0).contains(&distance) {
            score += 20.0;
        } else if distance > 2.0 && distance <= 5.0 {
            score += 15.0;
        } else if distance > 5.0 && distance <= 10.0 {
            score += 8.0;
        }

        if volume_avg > 0.0 {
            let ratio = last_bar(bars)?.volume / volume_avg;
            if ratio >= 1.5 {
                score += 15.0;
            } else if ratio >= 1.2 {
                score += 12.0;
            } else if ratio >= 1.0 {
                score += 8.0;
            }
        }

        if detect_bullish_divergence(bars, &rsi_series, DIVERGENCE_LOOKBACK)? {
            score += 10.0;
        }

        Ok(Score::new(score.min(100.0)))
    }
}
