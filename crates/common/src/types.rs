use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle. Histories are ordered oldest first, strictly ascending
/// by `open_time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Green (bullish) candle.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Close prices of a history, oldest first.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Volumes of a history, oldest first.
pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Discrete action produced by a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    #[default]
    None,
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::None => write!(f, "NONE"),
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// Where a strategy is meant to be used. Only consulted for registry filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyCategory {
    Trading,
    Scanner,
    Simulation,
    Both,
}

impl fmt::Display for StrategyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyCategory::Trading => write!(f, "trading"),
            StrategyCategory::Scanner => write!(f, "scanner"),
            StrategyCategory::Simulation => write!(f, "simulation"),
            StrategyCategory::Both => write!(f, "both"),
        }
    }
}

/// Position context passed into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionState {
    /// Quote currency available to spend.
    pub available_balance: f64,
    /// Base-asset quantity currently held. Zero means flat.
    pub position_size: f64,
    /// Average entry price of the open position. Zero when unknown.
    pub average_entry_price: f64,
    /// Number of averaging-down steps already taken.
    pub step_index: u32,
}

impl PositionState {
    pub fn flat(available_balance: f64) -> Self {
        Self {
            available_balance,
            ..Self::default()
        }
    }

    pub fn open(position_size: f64, average_entry_price: f64) -> Self {
        Self {
            available_balance: 0.0,
            position_size,
            average_entry_price,
            step_index: 0,
        }
    }

    pub fn with_step(mut self, step_index: u32) -> Self {
        self.step_index = step_index;
        self
    }

    pub fn is_flat(&self) -> bool {
        self.position_size == 0.0
    }

    pub fn has_entry_price(&self) -> bool {
        self.average_entry_price > 0.0
    }

    /// Unrealized P&L in percent relative to the average entry price.
    /// `None` when the entry price is unknown.
    pub fn pnl_percent(&self, price: f64) -> Option<f64> {
        self.has_entry_price()
            .then(|| (price - self.average_entry_price) / self.average_entry_price * 100.0)
    }
}

/// Outcome of one decision evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecisionResult {
    pub action: TradeAction,
    pub target_price: Option<f64>,
    pub stop_price: Option<f64>,
    /// Multiplier applied to the base order amount (averaging-down steps).
    pub size_multiplier: Option<f64>,
    pub rationale: String,
    pub reference_price: Option<f64>,
    pub reference_time: Option<DateTime<Utc>>,
    /// Snapshot of named indicator values observed on the last bar.
    pub indicators: BTreeMap<String, f64>,
}

impl DecisionResult {
    pub fn none(rationale: impl Into<String>) -> Self {
        Self {
            action: TradeAction::None,
            rationale: rationale.into(),
            ..Self::default()
        }
    }

    pub fn buy(rationale: impl Into<String>) -> Self {
        Self {
            action: TradeAction::Buy,
            rationale: rationale.into(),
            ..Self::default()
        }
    }

    pub fn sell(rationale: impl Into<String>) -> Self {
        Self {
            action: TradeAction::Sell,
            rationale: rationale.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, price: f64) -> Self {
        self.target_price = Some(price);
        self
    }

    pub fn with_stop(mut self, price: f64) -> Self {
        self.stop_price = Some(price);
        self
    }

    pub fn with_size_multiplier(mut self, multiplier: f64) -> Self {
        self.size_multiplier = Some(multiplier);
        self
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    /// Record the last bar the decision was made on.
    pub fn stamped(mut self, bar: &Bar) -> Self {
        self.reference_price = Some(bar.close);
        self.reference_time = Some(bar.open_time);
        self
    }
}

/// Signal strength in `[0, 100]`. Out-of-range and NaN inputs are clamped on
/// construction, so every `Score` in circulation is valid.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);
    pub const NEUTRAL: Score = Score(50.0);
    pub const MAX: Score = Score(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        // `+ 0.0` folds -0.0 into 0.0 so `Eq` and `Ord` agree
        Self(value.clamp(0.0, 100.0) + 0.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::new(value)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
