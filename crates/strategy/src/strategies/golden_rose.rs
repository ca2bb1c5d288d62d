use common::{closes, Bar, DecisionResult, PositionState, StrategyCategory};

use super::{crossed_above, last_bar};
use crate::indicators::{nth_back, sma};
use crate::{Strategy, StrategyError, StrategyParams};

/// Long-term trend follower on two SMAs with golden-ratio targets.
///
/// Enters when price crosses over the fast SMA while holding above the slow
/// one. Exits when the fast SMA falls back through the cycle-top line
/// (`sma2 * cycleTop`) or price drops 2 % under the fast SMA.
pub struct GoldenRose;

struct Config {
    sma1: usize,
    sma2: usize,
    tp: f64,
    cycle_top: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            sma1: params.get_or("sma1", 111),
            sma2: params.get_or("sma2", 350),
            tp: params.get_or("tp", 1.618),
            cycle_top: params.get_or("cycleTop", 2.0),
        }
    }
}

impl Strategy for GoldenRose {
    fn id(&self) -> &'static str {
        "strategy-golden-rose"
    }

    fn name(&self) -> &'static str {
        "Golden Rose Trend Strategy"
    }

    fn description(&self) -> &'static str {
        "Buys when price breaks above SMA 111 while above SMA 350; targets SMA 350 times the golden ratio and exits on a cycle top."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        let cfg = Config::from(params);
        cfg.sma1.max(cfg.sma2).saturating_add(1)
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let sma1_series = sma(&prices, cfg.sma1)?;
        let sma2_series = sma(&prices, cfg.sma2)?;

        let (Some(sma1), Some(sma2), Some(prev_sma1), Some(prev_sma2)) = (
            nth_back(&sma1_series, 0),
            nth_back(&sma2_series, 0),
            nth_back(&sma1_series, 1),
            nth_back(&sma2_series, 1),
        ) else {
            return Ok(DecisionResult::none("Moving averages not ready"));
        };

        let price = last_bar(bars)?.close;
        let prev_price = prices[prices.len() - 2];

        let decision = if position.is_flat() {
            if crossed_above(prev_price, prev_sma1, price, sma1) && price > sma2 {
                let mut target = sma2 * cfg.tp;
                if target <= price * 1.02 {
                    target = sma2 * cfg.cycle_top;
                }
                DecisionResult::buy(format!(
                    "Price broke above SMA{} ({sma1:.2}), target {}x ({target:.2})",
                    cfg.sma1, cfg.tp
                ))
                .with_target(target)
                .with_stop(sma1 * 0.97)
            } else {
                DecisionResult::none(format!("Waiting for a breakout above SMA{}", cfg.sma1))
            }
        } else if prev_sma1 > prev_sma2 * cfg.cycle_top && sma1 <= sma2 * cfg.cycle_top {
            DecisionResult::sell("Cycle top detected")
        } else if price < sma1 * 0.98 {
            DecisionResult::sell(format!("Trend broken, price below SMA{}", cfg.sma1))
        } else {
            DecisionResult::none("Holding, trend intact")
        };

        Ok(decision
            .with_indicator(format!("SMA{}", cfg.sma1), sma1)
            .with_indicator(format!("SMA{}", cfg.sma2), sma2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars_from_closes;
    use common::TradeAction;

    fn small() -> StrategyParams {
        StrategyParams::new().with("sma1", 3).with("sma2", 5)
    }

    #[test]
    fn buys_on_breakout_above_both_averages() {
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.0, 12.0]);
        let d = GoldenRose.decide(&bars, &PositionState::flat(1000.0), &small()).unwrap();
        assert_eq!(d.action, TradeAction::Buy);
        assert!((d.target_price.unwrap() - 16.18).abs() < 1e-9);
        assert!((d.stop_price.unwrap() - 9.7).abs() < 1e-9);
        assert!(d.indicators.contains_key("SMA3"));
    }

    #[test]
    fn falls_back_to_cycle_top_target_when_first_target_is_close() {
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.0, 12.0]);
        let params = small().with("tp", 1.1);
        let d = GoldenRose.decide(&bars, &PositionState::flat(1000.0), &params).unwrap();
        assert_eq!(d.action, TradeAction::Buy);
        assert!((d.target_price.unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn sells_when_trend_breaks() {
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 8.0]);
        let d = GoldenRose.decide(&bars, &PositionState::open(1.0, 10.0), &small()).unwrap();
        assert_eq!(d.action, TradeAction::Sell);
    }

    #[test]
    fn sells_on_cycle_top() {
        let bars = bars_from_closes(&[10.0, 10.0, 10.0, 12.0, 12.0, 12.0, 6.0]);
        let params = small().with("cycleTop", 1.0);
        let d = GoldenRose.decide(&bars, &PositionState::open(1.0, 10.0), &params).unwrap();
        assert_eq!(d.action, TradeAction::Sell);
        assert!(d.rationale.contains("Cycle top"));
    }

    #[test]
    fn minimum_history_tracks_parameters() {
        assert_eq!(GoldenRose.min_bars(&StrategyParams::new()), 351);
        assert_eq!(GoldenRose.min_bars(&small()), 6);
    }
}
