pub mod config;
pub mod error;
pub mod evaluation;
pub mod indicators;
pub mod params;
pub mod registry;
pub mod strategies;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{StrategyConfig, StrategyFileConfig};
pub use error::StrategyError;
pub use evaluation::ConfiguredStrategy;
pub use params::StrategyParams;
pub use registry::{RegistryBuilder, StrategyRegistry};

use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

/// All strategy implementations must satisfy this trait.
///
/// Implementations are stateless: configuration arrives with every call, so a
/// single shared instance can serve any number of concurrent evaluations.
/// Callers should go through [`ConfiguredStrategy`], which validates the
/// history and contains failures; the raw methods here may assume a
/// non-empty, ordered history of at least [`Strategy::min_bars`] bars.
pub trait Strategy: Send + Sync {
    /// Stable registry key.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn category(&self) -> StrategyCategory;

    /// Bars required before a decision can be computed.
    fn min_bars(&self, _params: &StrategyParams) -> usize {
        1
    }

    /// Bars required before a score can be computed.
    fn min_score_bars(&self, params: &StrategyParams) -> usize {
        self.min_bars(params)
    }

    /// Score reported when scoring is impossible or fails.
    fn neutral_score(&self) -> Score {
        Score::ZERO
    }

    /// Evaluate the latest bar and produce a trade decision.
    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError>;

    /// Rank the latest bar in `[0, 100]`. Strategies without a scanner score
    /// report their neutral score.
    fn score(&self, _bars: &[Bar], _params: &StrategyParams) -> Result<Score, StrategyError> {
        Ok(self.neutral_score())
    }
}
