use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::last_bar;
use crate::indicators::{last, sma};
use crate::{Strategy, StrategyError, StrategyParams};

/// Scanner ranking fresh SMA 111 breakouts above older ones.
pub struct Sma111Breakout;

const SMA_PERIOD: usize = 111;
const POINTS_PER_BAR: f64 = 5.0;

impl Strategy for Sma111Breakout {
    fn id(&self) -> &'static str {
        "Sma111BreakoutStrategy"
    }

    fn name(&self) -> &'static str {
        "SMA 111 Breakout (Scanner)"
    }

    fn description(&self) -> &'static str {
        "Scans for prices above SMA 111. Fresh breakouts score 100 and the score decays as the move ages."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Scanner
    }

    fn min_bars(&self, _params: &StrategyParams) -> usize {
        SMA_PERIOD
    }

    fn min_score_bars(&self, _params: &StrategyParams) -> usize {
        SMA_PERIOD + 1
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        _params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let Some(sma_now) = last(&sma(&closes(bars), SMA_PERIOD)?) else {
            return Ok(DecisionResult::none("SMA not ready"));
        };
        let price = last_bar(bars)?.close;

        let decision = match (price > sma_now, position.is_flat()) {
            (true, true) => {
                DecisionResult::buy(format!("Above SMA 111: {price:.8} > {sma_now:.8}"))
            }
            (true, false) => DecisionResult::none("Trend continues"),
            (false, false) => {
                DecisionResult::sell(format!("Fell below SMA 111: {price:.8} < {sma_now:.8}"))
            }
            (false, true) => DecisionResult::none("Below SMA 111"),
        };
        Ok(decision.with_indicator("SMA111", sma_now))
    }

    fn score(&self, bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        let prices = closes(bars);
        let series = sma(&prices, SMA_PERIOD)?;
        let Some(sma_now) = last(&series) else {
            return Ok(Score::ZERO);
        };
        let n = prices.len();
        if prices[n - 1] < sma_now {
            return Ok(Score::ZERO);
        }

        // Walk back until the first close under the SMA.
        let mut since_breakout = 0usize;
        for i in (SMA_PERIOD - 1..=n - 2).rev() {
            match series[i] {
                Some(avg) if prices[i] < avg => break,
                Some(_) => since_breakout += 1,
                None => break,
            }
        }

        Ok(Score::new(100.0 - since_breakout as f64 * POINTS_PER_BAR))
    }
}
