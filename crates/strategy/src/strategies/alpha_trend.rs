use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{crossed_above, crossed_below, last_bar};
use crate::indicators::{ema, last, nth_back, rsi};
use crate::{Strategy, StrategyError, StrategyParams};

/// EMA crossover trend follower with an RSI entry filter.
pub struct AlphaTrend;

struct Config {
    fast: usize,
    slow: usize,
    rsi_period: usize,
    rsi_buy: f64,
    rsi_sell: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            fast: params.get_or("fastEma", 20),
            slow: params.get_or("slowEma", 50),
            rsi_period: params.get_or("rsiPeriod", 14),
            rsi_buy: params.get_or("rsiBuy", 65.0),
            rsi_sell: params.get_or("rsiSell", 75.0),
        }
    }
}

impl Strategy for AlphaTrend {
    fn id(&self) -> &'static str {
        "strategy-alpha-trend"
    }

    fn name(&self) -> &'static str {
        "Alpha Trend"
    }

    fn description(&self) -> &'static str {
        "EMA 20/50 crossover trend follower. Enters on a golden cross unless RSI is overbought; exits on a death cross or when RSI is overbought and the EMA gap narrows. Target 5%, stop 3%."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        let cfg = Config::from(params);
        cfg.slow.max(cfg.rsi_period).saturating_add(1)
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let fast_series = ema(&prices, cfg.fast)?;
        let slow_series = ema(&prices, cfg.slow)?;
        let rsi_series = rsi(&prices, cfg.rsi_period)?;

        let (Some(fast), Some(slow), Some(rsi_now), Some(prev_fast), Some(prev_slow)) = (
            last(&fast_series),
            last(&slow_series),
            last(&rsi_series),
            nth_back(&fast_series, 1),
            nth_back(&slow_series, 1),
        ) else {
            return Ok(DecisionResult::none("Indicators not ready"));
        };
        let price = last_bar(bars)?.close;

        let decision = if position.is_flat() {
            if crossed_above(prev_fast, prev_slow, fast, slow) && rsi_now < cfg.rsi_buy {
                DecisionResult::buy(format!("EMA golden cross with RSI {rsi_now:.1}"))
                    .with_target(price * 1.05)
                    .with_stop(price * 0.97)
            } else {
                DecisionResult::none("No entry signal")
            }
        } else if crossed_below(prev_fast, prev_slow, fast, slow) {
            DecisionResult::sell("EMA death cross")
        } else if rsi_now > cfg.rsi_sell {
            // Overbought exits only once the EMA gap narrows
            let gap = (fast - slow) / slow * 100.0;
            let prev_gap = (prev_fast - prev_slow) / prev_slow * 100.0;
            if gap < prev_gap || rsi_now > 80.0 {
                DecisionResult::sell(format!(
                    "RSI overbought ({rsi_now:.1}) and trend weakening (EMA gap {gap:.2}%)"
                ))
            } else {
                DecisionResult::none("Overbought but trend still widening")
            }
        } else {
            DecisionResult::none("Holding")
        };

        Ok(decision
            .with_indicator(format!("EMA{}", cfg.fast), fast)
            .with_indicator(format!("EMA{}", cfg.slow), slow)
            .with_indicator("RSI", rsi_now))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let fast = last(&ema(&prices, cfg.fast)?).unwrap_or(0.0);
        let slow = last(&ema(&prices, cfg.slow)?).unwrap_or(0.0);
        let rsi_now = last(&rsi(&prices, cfg.rsi_period)?).unwrap_or(50.0);

        let mut score = 50.0;
        if fast > slow {
            score += 20.0;
        } else {
            score -= 20.0;
        }

        // Lower RSI scores higher
        if rsi_now < cfg.rsi_buy {
            score += 50.0 - rsi_now / 2.0;
        } else if rsi_now > cfg.rsi_sell {
            score -= (rsi_now - 50.0) / 2.0;
        }

        Ok(Score::new(score))
    }
}
