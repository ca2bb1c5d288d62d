use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use common::{Error, Result, StrategyCategory};

use crate::{strategies, ConfiguredStrategy, Strategy, StrategyParams};

/// Lookup table of every available strategy, keyed by id.
///
/// Built once and read-only afterwards, so it can be shared behind an `Arc`
/// by any number of concurrent scans. Lookups ignore ASCII case.
pub struct StrategyRegistry {
    /// Registration order, used for listing.
    strategies: Vec<Arc<dyn Strategy>>,
    /// Lower-cased id → index into `strategies`.
    index: HashMap<String, usize>,
}

impl StrategyRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry holding every built-in strategy.
    pub fn with_defaults() -> Result<Self> {
        strategies::builtin()
            .into_iter()
            .fold(Self::builder(), RegistryBuilder::register)
            .build()
    }

    /// Resolve a strategy by id, ignoring case.
    pub fn get(&self, id: &str) -> Result<Arc<dyn Strategy>> {
        self.index
            .get(&id.to_ascii_lowercase())
            .map(|&i| Arc::clone(&self.strategies[i]))
            .ok_or_else(|| Error::UnknownStrategy {
                id: id.to_string(),
                registered: self.ids().into_iter().map(str::to_string).collect(),
            })
    }

    /// Resolve a strategy and bind it to its own copy of `params`.
    pub fn configure(&self, id: &str, params: StrategyParams) -> Result<ConfiguredStrategy> {
        let strategy = self.get(id)?;
        debug!(strategy = %strategy.id(), params = params.len(), "Configured strategy");
        Ok(ConfiguredStrategy::new(strategy, params))
    }

    /// Every strategy in registration order.
    pub fn all(&self) -> &[Arc<dyn Strategy>] {
        &self.strategies
    }

    /// Strategies whose category is exactly `category`. `Both` is its own
    /// category and is not folded into the others.
    pub fn by_category(&self, category: StrategyCategory) -> Vec<Arc<dyn Strategy>> {
        self.strategies
            .iter()
            .filter(|s| s.category() == category)
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RegistryBuilder {
    strategies: Vec<Arc<dyn Strategy>>,
}

impl RegistryBuilder {
    pub fn register(mut self, strategy: Arc<dyn Strategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Finish the registry. Two strategies whose ids differ only by case are
    /// a duplicate.
    pub fn build(self) -> Result<StrategyRegistry> {
        let mut index = HashMap::with_capacity(self.strategies.len());
        for (i, strategy) in self.strategies.iter().enumerate() {
            if index.insert(strategy.id().to_ascii_lowercase(), i).is_some() {
                return Err(Error::DuplicateStrategy(strategy.id().to_string()));
            }
            info!(
                id = %strategy.id(),
                name = %strategy.name(),
                category = %strategy.category(),
                "Registered strategy"
            );
        }
        Ok(StrategyRegistry {
            strategies: self.strategies,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::{Dca, MarketBuy, Simulation};

    #[test]
    fn lookup_ignores_case() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        assert_eq!(registry.get("STRATEGY-DCA").unwrap().id(), "strategy-dca");
        assert_eq!(
            registry.get("sma111breakoutstrategy").unwrap().id(),
            "Sma111BreakoutStrategy"
        );
    }

    #[test]
    fn unknown_id_lists_registered() {
        let registry = StrategyRegistry::builder()
            .register(Arc::new(Dca))
            .register(Arc::new(MarketBuy))
            .build()
            .unwrap();
        let err = registry.get("nope").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unknown strategy 'nope'. Registered strategies: strategy-dca, strategy-market-buy"
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let result = StrategyRegistry::builder()
            .register(Arc::new(Simulation))
            .register(Arc::new(Simulation))
            .build();
        assert!(matches!(result, Err(Error::DuplicateStrategy(id)) if id == "strategy-simulation"));
    }

    #[test]
    fn category_filter_is_exact() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let both = registry.by_category(StrategyCategory::Both);
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id(), "strategy-simulation");
        assert!(registry
            .by_category(StrategyCategory::Trading)
            .iter()
            .all(|s| s.category() == StrategyCategory::Trading));
    }

    #[test]
    fn defaults_are_unique_and_complete() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 18);
        assert_eq!(registry.ids()[0], registry.all()[0].id());
    }

    #[test]
    fn configure_binds_params() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let cfg = registry
            .configure("strategy-dca", StrategyParams::new().with("dcaCount", 3))
            .unwrap();
        assert_eq!(cfg.id(), "strategy-dca");
        assert_eq!(cfg.params().get("dcaCount"), Some("3"));
    }
}
