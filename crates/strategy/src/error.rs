use thiserror::Error;

use crate::indicators::IndicatorError;

/// Failure raised inside a single strategy evaluation. The evaluation
/// boundary turns every variant into a neutral result; none of them escape
/// to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("malformed history: {0}")]
    MalformedHistory(String),

    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("computation fault: {0}")]
    Fault(String),
}
