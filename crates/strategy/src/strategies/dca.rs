use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::last_bar;
use crate::{Strategy, StrategyError, StrategyParams};

/// Martingale-style averaging down.
///
/// Opens immediately, buys again with a growing size each time price sits
/// `priceDeviation` percent under the average entry, and takes profit once
/// the position is `takeProfit` percent up.
pub struct Dca;

struct Config {
    max_steps: u32,
    price_deviation: f64,
    amount_scale: f64,
    take_profit: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            max_steps: params.get_or("dcaCount", 5),
            price_deviation: params.get_or("priceDeviation", 2.0),
            amount_scale: params.get_or("amountScale", 2.0),
            take_profit: params.get_or("takeProfit", 1.0),
        }
    }
}

impl Strategy for Dca {
    fn id(&self) -> &'static str {
        "strategy-dca"
    }

    fn name(&self) -> &'static str {
        "DCA Bot (Martingale)"
    }

    fn description(&self) -> &'static str {
        "Buys immediately, then averages down with a scaled order each time price falls a fixed percentage under the average entry."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn neutral_score(&self) -> Score {
        Score::NEUTRAL
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params);
        let price = last_bar(bars)?.close;

        if position.is_flat() {
            return Ok(DecisionResult::buy("DCA initial entry")
                .with_target(price * (1.0 + cfg.take_profit / 100.0)));
        }

        let Some(pnl) = position.pnl_percent(price) else {
            return Ok(DecisionResult::none("Waiting for entry price"));
        };

        if pnl >= cfg.take_profit {
            return Ok(DecisionResult::sell(format!("DCA take profit ({pnl:.2}%)")));
        }

        if position.step_index < cfg.max_steps && pnl <= -cfg.price_deviation {
            let next_step = position.step_index + 1;
            let multiplier = cfg.amount_scale.powi(next_step as i32);
            return Ok(DecisionResult::buy(format!(
                "DCA step {next_step}: {:.2}% under average entry",
                pnl.abs()
            ))
            .with_size_multiplier(multiplier));
        }

        Ok(DecisionResult::none(format!(
            "DCA holding at step {} ({pnl:.2}%)",
            position.step_index
        )))
    }

    fn score(&self, _bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        Ok(Score::NEUTRAL)
    }
}
