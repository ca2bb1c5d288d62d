use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{crossed_above, crossed_below, ensure_bars, last_bar};
use crate::indicators::{nth_back, sma, Series};
use crate::{Strategy, StrategyError, StrategyParams};

/// Classic 50/200 SMA golden cross.
pub struct GoldenCross;

/// Bars inspected for a recent cross when scoring.
const RECENT_CROSS_BARS: usize = 3;

struct Config {
    short_period: usize,
    long_period: usize,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            short_period: params.get_or("shortPeriod", 50),
            long_period: params.get_or("longPeriod", 200),
        }
    }

    fn min_bars(&self) -> usize {
        self.short_period.max(self.long_period).saturating_add(1)
    }

    fn averages(&self, bars: &[Bar]) -> Result<(Series, Series), StrategyError> {
        ensure_bars(bars, self.min_bars())?;
        let prices = closes(bars);
        Ok((sma(&prices, self.short_period)?, sma(&prices, self.long_period)?))
    }
}

/// Short average crossed above the long one on the bar `back` positions
/// before the last.
fn golden_cross_at(short: &[Option<f64>], long: &[Option<f64>], back: usize) -> bool {
    match (
        nth_back(short, back + 1),
        nth_back(long, back + 1),
        nth_back(short, back),
        nth_back(long, back),
    ) {
        (Some(ps), Some(pl), Some(s), Some(l)) => crossed_above(ps, pl, s, l),
        _ => false,
    }
}

impl Strategy for GoldenCross {
    fn id(&self) -> &'static str {
        "strategy-golden-cross"
    }

    fn name(&self) -> &'static str {
        "Golden Cross"
    }

    fn description(&self) -> &'static str {
        "Buys when the short SMA crosses above the long SMA and sells on the death cross. Target 10%, stop 8%."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        Config::from(params).min_bars()
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params);
        let (short, long) = cfg.averages(bars)?;
        let price = last_bar(bars)?.close;

        let (Some(prev_short), Some(prev_long), Some(short_now), Some(long_now)) = (
            nth_back(&short, 1),
            nth_back(&long, 1),
            nth_back(&short, 0),
            nth_back(&long, 0),
        ) else {
            return Ok(DecisionResult::none("Averages warming up"));
        };

        let decision = if position.is_flat() && crossed_above(prev_short, prev_long, short_now, long_now) {
            DecisionResult::buy(format!(
                "Golden cross: SMA{} crossed above SMA{} at {price:.2}",
                cfg.short_period, cfg.long_period
            ))
            .with_target(price * 1.10)
            .with_stop(price * 0.92)
        } else if !position.is_flat() && crossed_below(prev_short, prev_long, short_now, long_now) {
            DecisionResult::sell(format!(
                "Death cross: SMA{} fell below SMA{} at {price:.2}",
                cfg.short_period, cfg.long_period
            ))
        } else if short_now > long_now {
            DecisionResult::none("Bullish trend")
        } else {
            DecisionResult::none("Bearish trend")
        };

        Ok(decision
            .with_indicator(format!("SMA{}", cfg.short_period), short_now)
            .with_indicator(format!("SMA{}", cfg.long_period), long_now))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let (short, long) = Config::from(params).averages(bars)?;
        let (Some(short_now), Some(long_now)) = (nth_back(&short, 0), nth_back(&long, 0)) else {
            return Ok(Score::ZERO);
        };

        if (0..RECENT_CROSS_BARS).any(|back| golden_cross_at(&short, &long, back)) {
            return Ok(Score::MAX);
        }

        if short_now > long_now {
            let price = last_bar(bars)?.close;
            let score = if price > short_now && price > long_now {
                85.0
            } else {
                70.0
            };
            return Ok(Score::new(score));
        }
        Ok(Score::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars_from_closes;
    use common::TradeAction;

    fn params() -> StrategyParams {
        StrategyParams::new().with("shortPeriod", 3).with("longPeriod", 5)
    }

    fn with_tail(tail: &[f64]) -> Vec<Bar> {
        let mut closes = vec![10.0; 8];
        closes.extend_from_slice(tail);
        bars_from_closes(&closes)
    }

    #[test]
    fn buys_on_golden_cross() {
        let d = GoldenCross
            .decide(&with_tail(&[9.0, 9.0, 13.0]), &PositionState::flat(1000.0), &params())
            .unwrap();
        assert_eq!(d.action, TradeAction::Buy);
        assert!((d.target_price.unwrap() - 13.0 * 1.10).abs() < 1e-9);
        assert!((d.stop_price.unwrap() - 13.0 * 0.92).abs() < 1e-9);
        assert!(d.indicators.contains_key("SMA3"));
    }

    #[test]
    fn sells_on_death_cross_only_in_position() {
        let bars = with_tail(&[11.0, 11.0, 7.0]);
        let held = GoldenCross
            .decide(&bars, &PositionState::open(1.0, 10.0), &params())
            .unwrap();
        assert_eq!(held.action, TradeAction::Sell);
        let flat = GoldenCross
            .decide(&bars, &PositionState::flat(1000.0), &params())
            .unwrap();
        assert_eq!(flat.action, TradeAction::None);
    }

    #[test]
    fn score_tiers() {
        let p = params();
        let score = |tail: &[f64]| GoldenCross.score(&with_tail(tail), &p).unwrap().value();
        assert_eq!(score(&[9.0, 9.0, 13.0]), 100.0);
        assert_eq!(score(&[9.0, 9.0, 13.0, 14.0, 15.0]), 100.0);
        assert_eq!(score(&[9.0, 9.0, 13.0, 14.0, 15.0, 16.0]), 85.0);
        assert_eq!(score(&[9.0, 9.0, 13.0, 14.0, 15.0, 16.0, 13.5]), 70.0);
        assert_eq!(score(&[9.0, 8.0, 7.0]), 0.0);
    }

    #[test]
    fn default_periods_need_201_bars() {
        assert_eq!(GoldenCross.min_bars(&StrategyParams::new()), 201);
        let err = GoldenCross
            .score(&with_tail(&[]), &StrategyParams::new())
            .unwrap_err();
        assert!(matches!(err, StrategyError::InsufficientData { required: 201, .. }));
    }
}
