use serde::{Deserialize, Serialize};

use common::{Bar, Score, TradeAction};
use strategy::{StrategyConfig, StrategyParams};

/// One scan: which strategy, how it is configured, and the score floor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanRequest {
    pub strategy_id: String,
    #[serde(default)]
    pub params: StrategyParams,
    /// Results scoring below this are dropped. Falls back to
    /// `ScanSettings::default_min_score` when unset.
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl ScanRequest {
    pub fn new(strategy_id: impl Into<String>) -> Self {
        Self {
            strategy_id: strategy_id.into(),
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: StrategyParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Request built from a strategy profile.
    pub fn from_config(cfg: &StrategyConfig) -> Self {
        Self {
            strategy_id: cfg.id.clone(),
            params: cfg.params(),
            min_score: cfg.min_score,
        }
    }
}

/// A symbol and its bar history, supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResultItem {
    pub symbol: String,
    pub score: Score,
    pub suggested_action: TradeAction,
    /// Rationale of the suggested action.
    pub comment: String,
    pub last_price: f64,
}

/// An instrument whose evaluation task died.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub strategy_id: String,
    /// Ranked by score, highest first.
    pub results: Vec<ScanResultItem>,
    /// Symbols without any bars.
    pub skipped: Vec<String>,
    /// Symbols evaluated but scored under the floor.
    pub filtered: usize,
    pub failed: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn symbols(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.symbol.as_str()).collect()
    }
}
