use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, warn};

use common::{Bar, DecisionResult, PositionState, Score, StrategyCategory};

use crate::{Strategy, StrategyError, StrategyParams};

/// A strategy paired with its own parameter map.
///
/// This is the evaluation boundary: it validates the history, runs the
/// strategy with failures contained, and stamps the reference bar. Neither
/// [`generate_decision`](Self::generate_decision) nor
/// [`compute_score`](Self::compute_score) can fail or panic; problems surface
/// as a `None` decision or the strategy's neutral score.
///
/// Cloning is cheap and each clone owns its parameters, so concurrent
/// evaluations of the same strategy never share configuration.
#[derive(Clone)]
pub struct ConfiguredStrategy {
    strategy: Arc<dyn Strategy>,
    params: StrategyParams,
}

impl std::fmt::Debug for ConfiguredStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredStrategy")
            .field("id", &self.strategy.id())
            .field("params", &self.params)
            .finish()
    }
}

impl ConfiguredStrategy {
    pub fn new(strategy: Arc<dyn Strategy>, params: StrategyParams) -> Self {
        Self { strategy, params }
    }

    /// Replace the parameter map used by subsequent evaluations.
    pub fn set_parameters(&mut self, params: StrategyParams) {
        self.params = params;
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn id(&self) -> &'static str {
        self.strategy.id()
    }

    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn category(&self) -> StrategyCategory {
        self.strategy.category()
    }

    /// Decide on the latest bar.
    pub fn generate_decision(&self, bars: &[Bar], position: &PositionState) -> DecisionResult {
        let strategy = self.strategy.as_ref();
        let outcome = contain(|| {
            validate_history(bars, strategy.min_bars(&self.params))?;
            strategy.decide(bars, position, &self.params)
        });

        let decision = match outcome {
            Ok(decision) => decision,
            Err(err) => {
                self.report(&err, "decision");
                DecisionResult::none(describe(&err))
            }
        };

        match bars.last() {
            Some(last) => decision.stamped(last),
            None => decision,
        }
    }

    /// Score the latest bar in `[0, 100]`.
    pub fn compute_score(&self, bars: &[Bar]) -> Score {
        let strategy = self.strategy.as_ref();
        let outcome = contain(|| {
            validate_history(bars, strategy.min_score_bars(&self.params))?;
            strategy.score(bars, &self.params)
        });

        match outcome {
            Ok(score) => score,
            Err(err) => {
                self.report(&err, "score");
                strategy.neutral_score()
            }
        }
    }

    fn report(&self, err: &StrategyError, stage: &'static str) {
        let id = self.strategy.id();
        match err {
            StrategyError::InsufficientData { .. } => {
                debug!(strategy = %id, stage, error = %err, "Not enough history");
            }
            StrategyError::MalformedHistory(_) | StrategyError::InvalidParameters(_) => {
                warn!(strategy = %id, stage, error = %err, "Evaluation rejected");
            }
            StrategyError::Indicator(_) | StrategyError::Fault(_) => {
                error!(strategy = %id, stage, error = %err, "Evaluation failed");
            }
        }
    }
}

/// Check that `bars` is non-empty, strictly ascending by open time, carries
/// finite prices and holds at least `required` bars.
pub fn validate_history(bars: &[Bar], required: usize) -> Result<(), StrategyError> {
    let required = required.max(1);
    if bars.len() < required {
        return Err(StrategyError::InsufficientData {
            required,
            available: bars.len(),
        });
    }
    if let Some(i) = bars
        .windows(2)
        .position(|w| w[1].open_time <= w[0].open_time)
    {
        return Err(StrategyError::MalformedHistory(format!(
            "bar {} is not after bar {}",
            i + 1,
            i
        )));
    }
    if let Some(i) = bars.iter().position(|b| {
        ![b.open, b.high, b.low, b.close, b.volume]
            .iter()
            .all(|v| v.is_finite())
    }) {
        return Err(StrategyError::MalformedHistory(format!(
            "bar {i} has a non-finite value"
        )));
    }
    Ok(())
}

/// Run `f`, turning a panic into [`StrategyError::Fault`].
fn contain<T>(f: impl FnOnce() -> Result<T, StrategyError>) -> Result<T, StrategyError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(StrategyError::Fault(panic_message(payload.as_ref())))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn describe(err: &StrategyError) -> String {
    match err {
        StrategyError::InsufficientData {
            required,
            available,
        } => format!("Insufficient data: need {required} bars, have {available}"),
        other => format!("Evaluation error: {other}"),
    }
}
