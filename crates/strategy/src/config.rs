use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use common::Result;

use crate::StrategyParams;

/// Top-level strategy profile file (TOML).
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// id = "strategy-phoenix-momentum"
/// name = "Phoenix 1h"
/// min_score = 70
///
/// [strategy.params]
/// RsiPeriod = 14
/// BbPeriod = 20
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Registry id, matched case-insensitively.
    pub id: String,
    /// Human-readable name shown in logs.
    pub name: String,
    /// Scan results below this score are dropped.
    #[serde(default)]
    pub min_score: Option<f64>,
    /// Strategy-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, toml::Value>,
}

impl StrategyFileConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Profile whose id matches, ignoring case.
    pub fn find(&self, id: &str) -> Option<&StrategyConfig> {
        self.strategies.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }
}

impl StrategyConfig {
    /// Parameters as the string map strategies read from.
    pub fn params(&self) -> StrategyParams {
        StrategyParams::from_toml(&self.params)
    }
}
