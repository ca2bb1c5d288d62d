use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{crossed_above, crossed_below, last_bar};
use crate::indicators::{nth_back, sma};
use crate::{Strategy, StrategyError, StrategyParams};

/// Price crossing a single configurable SMA (111 by default).
pub struct SmaBreakout;

/// Bars inspected for a recent crossover when scoring.
const RECENT_CROSS_WINDOW: usize = 3;

fn period(params: &StrategyParams) -> usize {
    params.get_or("period", 111)
}

impl Strategy for SmaBreakout {
    fn id(&self) -> &'static str {
        "strategy-sma-111-breakout"
    }

    fn name(&self) -> &'static str {
        "SMA 111 Breakout"
    }

    fn description(&self) -> &'static str {
        "Follows price breaking upward through SMA 111, treated as the start of a strong trend."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Scanner
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        period(params).saturating_add(1)
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let period = period(params);
        let prices = closes(bars);
        let series = sma(&prices, period)?;
        let (Some(now), Some(prev)) = (nth_back(&series, 0), nth_back(&series, 1)) else {
            return Ok(DecisionResult::none("SMA not ready"));
        };
        let price = last_bar(bars)?.close;
        let prev_price = prices[prices.len() - 2];

        let decision = if position.is_flat() && crossed_above(prev_price, prev, price, now) {
            DecisionResult::buy(format!("Price broke above SMA {period} ({price:.2})"))
                .with_target(price * 1.05)
                .with_stop(price * 0.95)
        } else if !position.is_flat() && crossed_below(prev_price, prev, price, now) {
            DecisionResult::sell(format!("Price fell below SMA {period} ({price:.2})"))
        } else if price > now {
            DecisionResult::none("Above trend")
        } else {
            DecisionResult::none("Below trend")
        };
        Ok(decision.with_indicator(format!("SMA{period}"), now))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let prices = closes(bars);
        let series = sma(&prices, period(params))?;
        let Some(now) = nth_back(&series, 0) else {
            return Ok(Score::ZERO);
        };

        let n = prices.len();
        let recent_cross = (0..RECENT_CROSS_WINDOW).any(|back| {
            if back + 1 >= n {
                return false;
            }
            let i = n - 1 - back;
            match (series[i - 1], series[i]) {
                (Some(prev), Some(cur)) => crossed_above(prices[i - 1], prev, prices[i], cur),
                _ => false,
            }
        });
        if recent_cross {
            return Ok(Score::MAX);
        }

        let price = prices[n - 1];
        if price > now {
            let distance = (price - now) / now;
            let points = if distance < 0.01 {
                90.0
            } else if distance < 0.03 {
                80.0
            } else {
                70.0
            };
            return Ok(Score::new(points));
        }
        Ok(Score::ZERO)
    }
}
