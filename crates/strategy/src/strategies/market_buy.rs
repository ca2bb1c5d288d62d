use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

use crate::{Strategy, StrategyError, StrategyParams};

/// Buys at the current price as soon as it is asked to, with no levels.
pub struct MarketBuy;

impl Strategy for MarketBuy {
    fn id(&self) -> &'static str {
        "strategy-market-buy"
    }

    fn name(&self) -> &'static str {
        "Market Buy"
    }

    fn description(&self) -> &'static str {
        "Buys immediately at the current price."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn neutral_score(&self) -> Score {
        Score::NEUTRAL
    }

    fn decide(
        &self,
        _bars: &[Bar],
        position: &PositionState,
        _params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        if position.is_flat() {
            Ok(DecisionResult::buy("Immediate market buy on request"))
        } else {
            Ok(DecisionResult::none("Position already open"))
        }
    }

    fn score(&self, _bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        Ok(Score::NEUTRAL)
    }
}
