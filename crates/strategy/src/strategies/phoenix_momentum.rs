use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{last_bar, volume_average};
use crate::indicators::{bollinger_bands, last, macd, rsi, MacdConfig};
use crate::{Strategy, StrategyError, StrategyParams};

/// Short-term pump detector combining volume, Bollinger breakout, RSI and
/// MACD confirmation.
pub struct PhoenixMomentum;

const MIN_BARS: usize = 50;
const BB_STD_DEV: f64 = 2.0;
const VOLUME_SMA_PERIOD: usize = 20;

struct Config {
    rsi_period: usize,
    bb_period: usize,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            rsi_period: params.get_or("RsiPeriod", 14),
            bb_period: params.get_or("BbPeriod", 20),
        }
    }
}

impl Strategy for PhoenixMomentum {
    fn id(&self) -> &'static str {
        "strategy-phoenix-momentum"
    }

    fn name(&self) -> &'static str {
        "Phoenix Momentum"
    }

    fn description(&self) -> &'static str {
        "Combines volume, RSI, Bollinger Bands and MACD to catch sharp short-term rallies. Exits when RSI passes 85. Target 10%, stop 5%."
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
            let decision = if pnl >= 10.0 {
                DecisionResult::sell(format!("Phoenix take profit ({pnl:.2}%)"))
            } else if rsi_now > 85.0 {
                DecisionResult::sell(format!("RSI overbought ({rsi_now:.0}), momentum fading"))
            } else if pnl <= -5.0 {
                DecisionResult::sell(format!("Phoenix stop loss ({:.2}% loss)", pnl.abs()))
            } else {
                DecisionResult::none(format!("Phoenix holding: {pnl:.2}% (RSI {rsi_now:.0})"))
            };
            return Ok(decision.with_indicator("RSI", rsi_now));
        }

        let score = self.score(bars, params)?;
        if position.is_flat() && score.value() >= 80.0 {
            return Ok(DecisionResult::buy("Strong volume and momentum breakout")
                .with_target(price * 1.10)
                .with_stop(price * 0.95)
                .with_indicator("Score", score.value()));
        }
        Ok(DecisionResult::none("Momentum too weak").with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);
        let close = last_bar(bars)?.close;

        let rsi_now = last(&rsi(&prices, cfg.rsi_period)?);
        let upper = last(&bollinger_bands(&prices, cfg.bb_period, BB_STD_DEV)?.upper);
        let macd = macd(&prices, MacdConfig::default())?;
        let (Some(rsi_now), Some(upper), Some(macd_now), Some(signal)) = (
            rsi_now,
            upper,
            last(&macd.macd_line),
            last(&macd.signal_line),
        ) else {
            return Ok(Score::ZERO);
        };
        let Some(volume_avg) = volume_average(bars, VOLUME_SMA_PERIOD)? else {
            return Ok(Score::ZERO);
        };

        let mut score: f64 = 0.0;

        // Volume spike carries the most weight
        if volume_avg > 0.0 {
            let ratio = last_bar(bars)?.volume / volume_avg;
            if ratio >= 2.0 {
                score += 30.0;
            } else if ratio >= 1.5 {
                score += 20.0;
            } else if ratio >= 1.2 {
                score += 10.0;
            }
        }

        if close > upper {
            score += 25.0;
        } else if close >= upper * 0.99 {
            score += 20.0;
        }

        if (55.0..=75.0).contains(&rsi_now) {
            score += 25.0;
        } else if rsi_now > 75.0 && rsi_now < 85.0 {
            score += 15.0;
        } else if (50.0..55.0).contains(&rsi_now) {
            score += 10.0;
        }

        if macd_now > signal && macd_now > 0.0 {
            score += 20.0;
        } else if macd_now > signal {
            score += 10.0;
        }

        Ok(Score::new(score.min(100.0)))
    }
}
