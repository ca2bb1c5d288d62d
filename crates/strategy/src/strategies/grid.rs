use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::last_bar;
use crate::{Strategy, StrategyError, StrategyParams};

/// Range trading on an evenly spaced price grid between `lowerPrice` and
/// `upperPrice`.
pub struct Grid;

struct Config {
    count: usize,
    lower: f64,
    upper: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Result<Self, StrategyError> {
        let cfg = Self {
            count: params.get_or("gridCount", 10),
            lower: params.get_or("lowerPrice", 0.0),
            upper: params.get_or("upperPrice", 0.0),
        };
        if cfg.lower <= 0.0 || cfg.upper <= 0.0 {
            return Err(StrategyError::InvalidParameters(
                "grid needs positive lowerPrice and upperPrice".into(),
            ));
        }
        if cfg.upper <= cfg.lower {
            return Err(StrategyError::InvalidParameters(
                "grid upperPrice must be above lowerPrice".into(),
            ));
        }
        if cfg.count < 2 {
            return Err(StrategyError::InvalidParameters(
                "grid needs at least 2 levels".into(),
            ));
        }
        Ok(cfg)
    }

    fn step(&self) -> f64 {
        (self.upper - self.lower) / self.count as f64
    }

    /// Grid line at or below `price`, clamped to `0..=count`.
    fn level(&self, price: f64) -> usize {
        let raw = ((price - self.lower) / self.step()).trunc();
        raw.clamp(0.0, self.count as f64) as usize
    }
}

impl Strategy for Grid {
    fn id(&self) -> &'static str {
        "strategy-grid"
    }

    fn name(&self) -> &'static str {
        "Grid Trading"
    }

    fn description(&self) -> &'static str {
        "Buys in the lower half of a fixed price range and sells one grid line higher; stops out when price leaves the range."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params)?;
        let price = last_bar(bars)?.close;
        let step = cfg.step();
        let level = cfg.level(price);

        if price < cfg.lower * 0.95 {
            return Ok(if position.is_flat() {
                DecisionResult::none("Price below the grid range, waiting")
            } else {
                DecisionResult::sell("Grid stop: price fell well below the range")
            });
        }
        if price > cfg.upper * 1.05 {
            return Ok(if position.is_flat() {
                DecisionResult::none("Price above the grid range, waiting")
            } else {
                DecisionResult::sell("Grid exit: price rose above the range")
            });
        }

        if position.is_flat() {
            if price <= cfg.lower + step * (cfg.count as f64 / 2.0) {
                let target = (cfg.lower + level.saturating_add(1) as f64 * step).min(cfg.upper);
                return Ok(DecisionResult::buy(format!(
                    "Grid buy at level {level}/{} (target {target:.2})",
                    cfg.count
                ))
                .with_target(target)
                .with_stop(cfg.lower * 0.95));
            }
            return Ok(DecisionResult::none(format!(
                "Price in upper half ({level}/{}), waiting for a dip",
                cfg.count
            )));
        }

        if !position.has_entry_price() {
            return Ok(DecisionResult::none("Waiting for entry price"));
        }
        let entry = position.average_entry_price;
        let entry_level = cfg.level(entry);

        if level > entry_level {
            let profit = (price - entry) / entry * 100.0;
            return Ok(DecisionResult::sell(format!(
                "Grid sell: level {entry_level} -> {level} ({profit:.2}%)"
            )));
        }
        if level.saturating_add(1) < entry_level && price < entry * 0.97 {
            return Ok(DecisionResult::sell(format!(
                "Grid stop: price dropped {} levels",
                entry_level - level
            )));
        }

        let target = cfg.lower + entry_level.saturating_add(1) as f64 * step;
        Ok(DecisionResult::none(format!(
            "Grid holding at level {level}, target {target:.2}"
        )))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let cfg = Config::from(params)?;
        let price = last_bar(bars)?.close;
        if price < cfg.lower || price > cfg.upper {
            return Ok(Score::ZERO);
        }

        let position = (price - cfg.lower) / (cfg.upper - cfg.lower);
        let points = if position <= 0.3 {
            85.0
        } else if position <= 0.5 {
            70.0
        } else if position <= 0.7 {
            50.0
        } else {
            30.0
        };
        Ok(Score::new(points))
    }
}
