use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{last_bar, volume_ratio};
use crate::indicators::{
    detect_bullish_divergence, detect_hidden_bullish_divergence, last, macd, nth_back, rsi,
    MacdConfig,
};
use crate::{Strategy, StrategyError, StrategyParams};

/// Spots trend reversals through RSI and MACD bullish divergences.
pub struct DivergenceDetector;

const MIN_BARS: usize = 50;
const VOLUME_SMA_PERIOD: usize = 20;

struct Config {
    rsi_period: usize,
    lookback: usize,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            rsi_period: params.get_or("RsiPeriod", 14),
            lookback: params.get_or("DivergenceLookback", 20),
        }
    }
}

impl Strategy for DivergenceDetector {
    fn id(&self) -> &'static str {
        "strategy-divergence-detector"
    }

    fn name(&self) -> &'static str {
        "Divergence Detector"
    }

    fn description(&self) -> &'static str {
        "Finds bullish divergences between price and RSI/MACD that often precede a reversal. Target 12%, stop 5%."
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
            DecisionResult::none("Holding divergence position")
        } else if score.value() >= 70.0 {
            DecisionResult::buy("Bullish divergence, possible trend reversal")
                .with_target(price * 1.12)
                .with_stop(price * 0.95)
        } else {
            DecisionResult::none("No divergence")
        };
        Ok(decision.with_indicator("Score", score.value()))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params);
        let prices = closes(bars);

        let rsi_series = rsi(&prices, cfg.rsi_period)?;
        let Some(rsi_now) = last(&rsi_series) else {
            return Ok(Score::ZERO);
        };
        let histogram = macd(&prices, MacdConfig::default())?.histogram;

        let mut score: f64 = 0.0;

        if detect_bullish_divergence(bars, &rsi_series, cfg.lookback)? {
            score += 35.0;
        } else if detect_hidden_bullish_divergence(bars, &rsi_series, cfg.lookback)? {
            score += 25.0;
        }

        if detect_bullish_divergence(bars, &histogram, cfg.lookback)? {
            score += 25.0;
        }

        if rsi_now <= 30.0 {
            score += 20.0;
        } else if rsi_now <= 40.0 {
            score += 15.0;
        }

        if let Some(ratio) = volume_ratio(bars, VOLUME_SMA_PERIOD)? {
            if ratio >= 1.3 {
                score += 10.0;
            } else if ratio >= 1.0 {
                score += 5.0;
            }
        }

        // Histogram turning up from below zero
        if let (Some(prev), Some(now)) = (nth_back(&histogram, 1), last(&histogram)) {
            if prev < 0.0 && now > prev {
                score += 10.0;
            }
        }

        Ok(Score::new(score.min(100.0)))
    }
}
