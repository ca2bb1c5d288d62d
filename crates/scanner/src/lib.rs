pub mod report;

pub use report::{Instrument, ScanFailure, ScanReport, ScanRequest, ScanResultItem};

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use common::{PositionState, Result, ScanSettings, Score};
use strategy::{ConfiguredStrategy, StrategyRegistry};

/// Balance assumed for the suggested action: every instrument is evaluated as
/// if no position were open.
const SCAN_BALANCE: f64 = 1000.0;

/// Runs one configured strategy across a universe of instruments.
///
/// Each instrument is evaluated on the blocking pool with at most
/// `max_concurrency` evaluations in flight. Dropping the future returned by
/// [`Scanner::scan`] aborts every evaluation that has not started yet.
#[derive(Clone)]
pub struct Scanner {
    registry: Arc<StrategyRegistry>,
    settings: ScanSettings,
}

enum Outcome {
    Ranked(ScanResultItem),
    Filtered,
    Skipped,
    Failed(String),
}

impl Scanner {
    pub fn new(registry: Arc<StrategyRegistry>, settings: ScanSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Score every instrument and rank the survivors.
    ///
    /// An unknown strategy id fails before any work starts. Failures of
    /// individual instruments never abort the sweep; they are reported in
    /// [`ScanReport::failed`].
    pub async fn scan(&self, request: ScanRequest, universe: Vec<Instrument>) -> Result<ScanReport> {
        let strategy = self.registry.configure(&request.strategy_id, request.params)?;
        let min_score = request.min_score.or(self.settings.default_min_score);
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrency.max(1)));

        info!(
            strategy = %strategy.id(),
            instruments = universe.len(),
            min_score = ?min_score,
            "Starting scan"
        );

        let mut tasks = JoinSet::new();
        for (index, instrument) in universe.into_iter().enumerate() {
            let strategy = strategy.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let symbol = instrument.symbol.clone();
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (index, symbol, Outcome::Failed("scan cancelled".into()));
                };
                let outcome = tokio::task::spawn_blocking(move || {
                    evaluate(&strategy, &instrument, min_score)
                })
                .await
                .unwrap_or_else(|e| Outcome::Failed(e.to_string()));
                (index, symbol, outcome)
            });
        }

        let mut ranked = Vec::new();
        let mut report = ScanReport {
            strategy_id: strategy.id().to_string(),
            ..ScanReport::default()
        };
        while let Some(joined) = tasks.join_next().await {
            let (index, symbol, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    error!(error = %e, "Scan task failed");
                    report.failed.push(ScanFailure {
                        symbol: String::new(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match outcome {
                Outcome::Ranked(item) => ranked.push((index, item)),
                Outcome::Filtered => report.filtered += 1,
                Outcome::Skipped => report.skipped.push(symbol),
                Outcome::Failed(reason) => {
                    error!(symbol = %symbol, reason = %reason, "Instrument evaluation failed");
                    report.failed.push(ScanFailure { symbol, reason });
                }
            }
        }

        // Highest score first; ties keep the order of the universe
        ranked.sort_by(|(ia, a), (ib, b)| b.score.cmp(&a.score).then(ia.cmp(ib)));
        report.results = ranked.into_iter().map(|(_, item)| item).collect();
        report.skipped.sort();

        info!(
            strategy = %report.strategy_id,
            results = report.results.len(),
            filtered = report.filtered,
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Scan complete"
        );
        Ok(report)
    }
}

fn evaluate(strategy: &ConfiguredStrategy, instrument: &Instrument, min_score: Option<f64>) -> Outcome {
    let Some(last) = instrument.bars.last() else {
        warn!(symbol = %instrument.symbol, "No bars for instrument, skipping");
        return Outcome::Skipped;
    };

    let score = strategy.compute_score(&instrument.bars);
    if let Some(floor) = min_score {
        if score < Score::new(floor) {
            debug!(symbol = %instrument.symbol, score = %score, floor, "Below minimum score");
            return Outcome::Filtered;
        }
    }

    let decision = strategy.generate_decision(&instrument.bars, &PositionState::flat(SCAN_BALANCE));
    Outcome::Ranked(ScanResultItem {
        symbol: instrument.symbol.clone(),
        score,
        suggested_action: decision.action,
        comment: decision.rationale,
        last_price: last.close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use common::{Bar, Error, TradeAction};
    use strategy::StrategyParams;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                open_time: DateTime::<Utc>::UNIX_EPOCH + Duration::hours(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1000.0,
            })
            .collect()
    }

    fn scanner(max_concurrency: usize) -> Scanner {
        let registry = Arc::new(StrategyRegistry::with_defaults().unwrap());
        let settings = ScanSettings {
            max_concurrency,
            ..ScanSettings::default()
        };
        Scanner::new(registry, settings)
    }

    /// Simulation scores `60 + len % 31`, which makes ranking easy to steer.
    fn sized(symbol: &str, len: usize) -> Instrument {
        Instrument::new(symbol, bars_from_closes(&vec![100.0; len]))
    }

    #[tokio::test]
    async fn ranks_by_score_descending() {
        let universe = vec![sized("AAA", 1), sized("BBB", 30), sized("CCC", 10)];
        let report = scanner(2)
            .scan(ScanRequest::new("strategy-simulation"), universe)
            .await
            .unwrap();
        assert_eq!(report.symbols(), vec!["BBB", "CCC", "AAA"]);
        assert_eq!(report.results[0].score, Score::new(90.0));
        assert_eq!(report.results[0].suggested_action, TradeAction::Buy);
        assert_eq!(report.results[0].last_price, 100.0);
    }

    #[tokio::test]
    async fn ties_keep_universe_order() {
        let universe = vec![sized("ZZZ", 5), sized("AAA", 5), sized("MMM", 5)];
        let report = scanner(1)
            .scan(ScanRequest::new("strategy-simulation"), universe)
            .await
            .unwrap();
        assert_eq!(report.symbols(), vec!["ZZZ", "AAA", "MMM"]);
    }

    #[tokio::test]
    async fn min_score_filters() {
        let universe = vec![sized("LOW", 1), sized("HIGH", 20)];
        let report = scanner(4)
            .scan(ScanRequest::new("strategy-simulation").with_min_score(70.0), universe)
            .await
            .unwrap();
        assert_eq!(report.symbols(), vec!["HIGH"]);
        assert_eq!(report.filtered, 1);
    }

    #[tokio::test]
    async fn settings_floor_applies_when_request_has_none() {
        let registry = Arc::new(StrategyRegistry::with_defaults().unwrap());
        let settings = ScanSettings {
            default_min_score: Some(75.0),
            ..ScanSettings::default()
        };
        let report = Scanner::new(registry, settings)
            .scan(
                ScanRequest::new("strategy-simulation"),
                vec![sized("A", 10), sized("B", 20)],
            )
            .await
            .unwrap();
        assert_eq!(report.symbols(), vec!["B"]);
    }

    #[tokio::test]
    async fn empty_instruments_are_skipped() {
        let universe = vec![Instrument::new("EMPTY", Vec::new()), sized("FULL", 3)];
        let report = scanner(2)
            .scan(ScanRequest::new("strategy-market-buy"), universe)
            .await
            .unwrap();
        assert_eq!(report.skipped, vec!["EMPTY".to_string()]);
        assert_eq!(report.symbols(), vec!["FULL"]);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn short_history_gets_neutral_score() {
        let report = scanner(2)
            .scan(ScanRequest::new("strategy-trend-surfer"), vec![sized("NEW", 20)])
            .await
            .unwrap();
        assert_eq!(report.results[0].score, Score::ZERO);
        assert_eq!(report.results[0].suggested_action, TradeAction::None);
        assert!(report.results[0].comment.starts_with("Insufficient data"));
    }

    #[tokio::test]
    async fn unknown_strategy_fails_up_front() {
        let err = scanner(2)
            .scan(ScanRequest::new("no-such-strategy"), vec![sized("A", 5)])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownStrategy { .. }));
    }

    #[tokio::test]
    async fn request_params_reach_the_strategy() {
        // A single grid line makes the grid configuration invalid
        let params = StrategyParams::new()
            .with("lowerPrice", 90)
            .with("upperPrice", 110)
            .with("gridCount", 1);
        let report = scanner(2)
            .scan(
                ScanRequest::new("strategy-grid").with_params(params),
                vec![sized("GRID", 5)],
            )
            .await
            .unwrap();
        assert_eq!(report.results[0].score, Score::ZERO);
        assert_eq!(report.results[0].suggested_action, TradeAction::None);
    }

    #[tokio::test]
    async fn overflowing_lookback_is_neutral_not_failed() {
        let params = StrategyParams::new().with("slowEma", usize::MAX);
        let report = scanner(2)
            .scan(
                ScanRequest::new("strategy-alpha-trend").with_params(params),
                vec![sized("WIDE", 60)],
            )
            .await
            .unwrap();
        assert!(report.failed.is_empty(), "{:?}", report.failed);
        assert_eq!(report.results[0].score, Score::ZERO);
        assert_eq!(report.results[0].suggested_action, TradeAction::None);
    }

    #[tokio::test]
    async fn negative_zero_floor_keeps_zero_scores() {
        let report = scanner(2)
            .scan(
                ScanRequest::new("strategy-trend-surfer").with_min_score(-0.0),
                vec![sized("NEW", 20)],
            )
            .await
            .unwrap();
        assert_eq!(report.symbols(), vec!["NEW"]);
        assert_eq!(report.filtered, 0);
    }

    #[test]
    fn request_from_profile() {
        let file = strategy::StrategyFileConfig::from_toml_str(
            r#"
            [[strategy]]
            id = "strategy-scout-breakout"
            name = "Scout"
            min_score = 65
            [strategy.params]
            volMult = 2.0
            "#,
        )
        .unwrap();
        let request = ScanRequest::from_config(&file.strategies[0]);
        assert_eq!(request.strategy_id, "strategy-scout-breakout");
        assert_eq!(request.min_score, Some(65.0));
        assert_eq!(request.params.get("volMult"), Some("2.0"));
    }

    #[test]
    fn request_deserializes_from_json() {
        let request: ScanRequest = serde_json::from_str(
            r#"{"strategy_id":"strategy-dca","params":{"dcaCount":"3"},"min_score":40}"#,
        )
        .unwrap();
        assert_eq!(request.params.get("dcaCount"), Some("3"));
        assert_eq!(request.min_score, Some(40.0));
    }
}
