use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{crossed_above, crossed_below, last_bar};
use crate::indicators::{last, nth_back, sma};
use crate::{Strategy, StrategyError, StrategyParams};

/// One trade per SMA 111 crossing: buy on the cross up, sell on the cross
/// down. SMA 350 and its Fibonacci multiples are reported for charting.
pub struct Sma111BuySell;

const SMA_FAST: usize = 111;
const SMA_SLOW: usize = 350;

const SLOW_MULTIPLES: [(&str, f64); 8] = [
    ("x0.702", 0.702),
    ("x1.618", 1.618),
    ("x2.0", 2.0),
    ("x3.0", 3.0),
    ("x5.0", 5.0),
    ("x8.0", 8.0),
    ("x13.0", 13.0),
    ("x21.0", 21.0),
];

impl Strategy for Sma111BuySell {
    fn id(&self) -> &'static str {
        "Sma111BuySellStrategy"
    }

    fn name(&self) -> &'static str {
        "SMA 111 Crossover Buy/Sell"
    }

    fn description(&self) -> &'static str {
        "Buys when price crosses above the 111-period SMA and sells when it crosses back below."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn min_bars(&self, _params: &StrategyParams) -> usize {
        SMA_SLOW.max(SMA_FAST + 1)
    }

    fn min_score_bars(&self, _params: &StrategyParams) -> usize {
        SMA_FAST
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        _params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let prices = closes(bars);
        let fast = sma(&prices, SMA_FAST)?;
        let slow = sma(&prices, SMA_SLOW)?;
        let (Some(fast_now), Some(fast_prev), Some(slow_now)) =
            (nth_back(&fast, 0), nth_back(&fast, 1), last(&slow))
        else {
            return Ok(DecisionResult::none("Not enough SMA data"));
        };

        let price = last_bar(bars)?.close;
        let prev_price = prices[prices.len() - 2];

        let mut decision = if position.is_flat() {
            if crossed_above(prev_price, fast_prev, price, fast_now) {
                DecisionResult::buy(format!(
                    "SMA 111 cross up: {prev_price:.8} -> {price:.8}, SMA {fast_now:.8}"
                ))
            } else if price > fast_now {
                DecisionResult::none("Trend up, waiting for a fresh crossover")
            } else {
                DecisionResult::none("Trend down")
            }
        } else if crossed_below(prev_price, fast_prev, price, fast_now) {
            DecisionResult::sell(format!(
                "SMA 111 cross down: {prev_price:.8} -> {price:.8}, SMA {fast_now:.8}"
            ))
        } else {
            DecisionResult::none(format!("Holding position, SMA 111 at {fast_now:.8}"))
        };

        decision = decision
            .with_indicator("SMA111", fast_now)
            .with_indicator("SMA350", slow_now);
        for (label, multiple) in SLOW_MULTIPLES {
            decision = decision.with_indicator(label, slow_now * multiple);
        }
        Ok(decision)
    }

    fn score(&self, bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        let Some(fast_now) = last(&sma(&closes(bars), SMA_FAST)?) else {
            return Ok(Score::ZERO);
        };
        let price = last_bar(bars)?.close;
        Ok(if price > fast_now {
            Score::new(80.0)
        } else {
            Score::new(20.0)
        })
    }
}
