use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::last_bar;
use crate::indicators::{adx, detect_ema_cross, last, rsi};
use crate::{Strategy, StrategyError, StrategyParams};

/// Rides established uptrends: strong ADX, +DI leading and the fast EMA above
/// the slow one.
pub struct TrendSurfer;

const MIN_BARS: usize = 200;
const STRONG_TREND: f64 = 25.0;
const RSI_PERIOD: usize = 14;

struct Config {
    adx_period: usize,
    fast_ema: usize,
    slow_ema: usize,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            adx_period: params.get_or("AdxPeriod", 14),
            fast_ema: params.get_or("FastEmaPeriod", 50),
            slow_ema: params.get_or("SlowEmaPeriod", 200),
        }
    }
}

impl Strategy for TrendSurfer {
    fn id(&self) -> &'static str {
        "strategy-trend-surfer"
    }

    fn name(&self) -> &'static str {
        "Trend Surfer"
    }

    fn description(&self) -> &'static str {
        "Joins strong uptrends confirmed by ADX, directional movement and the 50/200 EMA structure. Target 20%, stop 8%."
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
            let trend = adx(bars, cfg.adx_period)?;
            let cross = detect_ema_cross(&closes(bars), cfg.fast_ema, cfg.slow_ema)?;
            let adx_now = last(&trend.adx);

            let reversed = match (last(&trend.plus_di), last(&trend.minus_di), adx_now) {
                (Some(plus), Some(minus), Some(strength)) => minus > plus && strength > STRONG_TREND,
                _ => false,
            };

            let decision = if pnl >= 20.0 {
                DecisionResult::sell(format!("Trend Surfer take profit ({pnl:.2}%)"))
            } else if reversed {
                DecisionResult::sell("Trend reversed: -DI above +DI with a strong ADX")
            } else if cross.is_death_cross {
                DecisionResult::sell("Death cross")
            } else if pnl <= -8.0 {
                DecisionResult::sell(format!("Trend Surfer stop loss ({:.2}% loss)", pnl.abs()))
            } else {
                DecisionResult::none(format!("Riding the trend: {pnl:.2}%"))
            };
            return Ok(match adx_now {
                Some(v) => decision.with_indicator("ADX", v),
                None => decision,
            });
        }

        let score = self.score(bars, params)?;
        let decision = if position.is_flat() && score.value() >= 70.0 {
            DecisionResult::buy("Strong uptrend")
                .with_target(price * 1.20)
                .with_stop(price * 0.92)
        } else {
            DecisionResult::none("Trend too weak")
        };
        Ok(decision.with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let close = last_bar(bars)?.close;

        let trend = adx(bars, cfg.adx_period)?;
        let cross = detect_ema_cross(&prices, cfg.fast_ema, cfg.slow_ema)?;
        let rsi_now = last(&rsi(&prices, RSI_PERIOD)?);

        let (Some(adx_now), Some(plus_di), Some(minus_di)) =
            (last(&trend.adx), last(&trend.plus_di), last(&trend.minus_di))
        else {
            return Ok(Score::ZERO);
        };

        let mut score: f64 = if adx_now >= 50.0 {
            35.0
        } else if adx_now >= 40.0 {
            30.0
        } else if adx_now >= STRONG_TREND {
            25.0
        } else if adx_now >= 20.0 {
            15.0
        } else {
            5.0
        };

        if plus_di > minus_di {
            let spread = plus_di - minus_di;
            score += if spread > 20.0 {
                25.0
            } else if spread > 10.0 {
                20.0
            } else if spread > 5.0 {
                15.0
            } else {
                10.0
            };
        }

        if let (Some(fast), Some(slow)) = (cross.fast_ema, cross.slow_ema) {
            if fast > slow {
                score += 20.0;
                if cross.is_golden_cross {
                    score += 5.0;
                }
            }
        }

        if cross.fast_ema.is_some_and(|fast| close > fast) {
            score += 10.0;
        }

        match rsi_now {
            Some(r) if (50.0..=70.0).contains(&r) => score += 10.0,
            Some(r) if r > 70.0 && r <= 80.0 => score += 5.0,
            _ => {}
        }

        Ok(Score::new(score.min(100.0)))
    }
}
