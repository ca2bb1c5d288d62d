use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::last_bar;
use crate::{Strategy, StrategyError, StrategyParams};

/// Exercises the full buy/sell flow without any market logic: buys when flat
/// and exits at ±5 %. Its score is deterministic in the history length.
pub struct Simulation;

const EXIT_PERCENT: f64 = 5.0;

impl Strategy for Simulation {
    fn id(&self) -> &'static str {
        "strategy-simulation"
    }

    fn name(&self) -> &'static str {
        "Simulation Strategy"
    }

    fn description(&self) -> &'static str {
        "Buys whenever flat and closes at 5% profit or 5% loss. Used to verify the trading flow end to end."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Both
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        _params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let price = last_bar(bars)?.close;

        if position.is_flat() {
            return Ok(DecisionResult::buy("Simulation entry")
                .with_target(price * 1.05)
                .with_stop(price * 0.95));
        }

        match position.pnl_percent(price) {
            Some(pnl) if pnl >= EXIT_PERCENT => {
                Ok(DecisionResult::sell(format!("Simulation take profit ({pnl:.2}%)")))
            }
            Some(pnl) if pnl <= -EXIT_PERCENT => {
                Ok(DecisionResult::sell(format!("Simulation stop loss ({pnl:.2}%)")))
            }
            _ => Ok(DecisionResult::none("Simulation holding, waiting for TP/SL")),
        }
    }

    /// `60 + len % 31`, so always within 60..=90.
    fn score(&self, bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        if bars.is_empty() {
            return Ok(Score::ZERO);
        }
        Ok(Score::new(60.0 + (bars.len() % 31) as f64))
    }
}
