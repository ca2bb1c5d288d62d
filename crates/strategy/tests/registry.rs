mod support;

use std::thread;

use common::{Error, PositionState, Score, StrategyCategory, TradeAction};
use strategy::{StrategyFileConfig, StrategyParams, StrategyRegistry};
use support::bars_from_closes;

const ALL_IDS: [&str; 18] = [
    "strategy-golden-rose",
    "strategy-dca",
    "strategy-simulation",
    "strategy-market-buy",
    "strategy-grid",
    "strategy-alpha-trend",
    "strategy-phoenix-momentum",
    "strategy-sma-111-breakout",
    "Sma111BreakoutStrategy",
    "Sma111BuySellStrategy",
    "strategy-whale-accumulation",
    "strategy-scout-breakout",
    "strategy-breakout-hunter",
    "strategy-divergence-detector",
    "strategy-trend-surfer",
    "strategy-golden-cross",
    "strategy-oversold-recovery",
    "BistMultiMaBreakoutStrategy",
];

#[test]
fn every_builtin_is_registered() {
    let registry = StrategyRegistry::with_defaults().unwrap();
    assert_eq!(registry.ids(), ALL_IDS.to_vec());
    for id in ALL_IDS {
        assert_eq!(registry.get(&id.to_uppercase()).unwrap().id(), id);
    }
}

#[test]
fn unknown_id_names_every_registered_strategy() {
    let registry = StrategyRegistry::with_defaults().unwrap();
    let err = registry.configure("unknown-id", StrategyParams::new()).err().unwrap();
    assert!(matches!(&err, Error::UnknownStrategy { id, .. } if id == "unknown-id"));
    let message = err.to_string();
    for id in ALL_IDS {
        assert!(message.contains(id), "{id} missing from: {message}");
    }
}

#[test]
fn categories_partition_the_registry() {
    let registry = StrategyRegistry::with_defaults().unwrap();
    let count = |c| registry.by_category(c).len();
    assert_eq!(count(StrategyCategory::Trading), 8);
    assert_eq!(count(StrategyCategory::Scanner), 9);
    assert_eq!(count(StrategyCategory::Both), 1);
    assert_eq!(count(StrategyCategory::Simulation), 0);
}

/// Two configurations of the same strategy evaluated side by side on many
/// threads see only their own parameters.
#[test]
fn concurrent_configurations_are_isolated() {
    let registry = StrategyRegistry::with_defaults().unwrap();
    let closes: Vec<f64> = (0..150)
        .map(|i| 100.0 + (i as f64 * 0.37).sin() * 5.0 + i as f64 * 0.05)
        .collect();
    let bars = bars_from_closes(&closes);

    let fast = registry
        .configure("strategy-sma-111-breakout", StrategyParams::new().with("period", 5))
        .unwrap();
    let slow = registry
        .configure("strategy-sma-111-breakout", StrategyParams::new().with("period", 120))
        .unwrap();
    let expected_fast = (fast.compute_score(&bars), fast.generate_decision(&bars, &PositionState::flat(1000.0)));
    let expected_slow = (slow.compute_score(&bars), slow.generate_decision(&bars, &PositionState::flat(1000.0)));
    assert_ne!(expected_fast.1.indicators, expected_slow.1.indicators);

    thread::scope(|s| {
        for i in 0..16 {
            let (cfg, expected) = if i % 2 == 0 {
                (fast.clone(), &expected_fast)
            } else {
                (slow.clone(), &expected_slow)
            };
            let bars = &bars;
            s.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(cfg.compute_score(bars), expected.0);
                    assert_eq!(cfg.generate_decision(bars, &PositionState::flat(1000.0)), expected.1);
                }
            });
        }
    });
}

#[test]
fn alpha_trend_buys_on_golden_cross_with_room_on_rsi() {
    let closes: Vec<f64> = (0..71)
        .map(|i| {
            if i < 40 {
                100.0 - 0.3 * i as f64
            } else {
                88.0 + 0.25 * (i - 40) as f64 + if i % 2 == 0 { 1.5 } else { -1.5 }
            }
        })
        .collect();
    let bars = bars_from_closes(&closes);
    let registry = StrategyRegistry::with_defaults().unwrap();
    let alpha = registry.configure("strategy-alpha-trend", StrategyParams::new()).unwrap();

    let decision = alpha.generate_decision(&bars, &PositionState::flat(1000.0));
    assert_eq!(decision.action, TradeAction::Buy);
    assert!((decision.target_price.unwrap() - 97.0 * 1.05).abs() < 1e-9);
    assert!((decision.stop_price.unwrap() - 97.0 * 0.97).abs() < 1e-9);
    assert_eq!(decision.reference_price, Some(97.0));

    // A tighter RSI ceiling vetoes the same cross
    let strict = registry
        .configure("strategy-alpha-trend", StrategyParams::new().with("rsiBuy", 50))
        .unwrap();
    assert_eq!(strict.generate_decision(&bars, &PositionState::flat(1000.0)).action, TradeAction::None);
}

#[test]
fn profiles_drive_configuration() {
    let file = StrategyFileConfig::from_toml_str(
        r#"
        [[strategy]]
        id = "strategy-market-buy"
        name = "Instant"

        [[strategy]]
        id = "strategy-golden-cross"
        name = "Fast cross"
        [strategy.params]
        shortPeriod = 3
        longPeriod = 5
        "#,
    )
    .unwrap();
    let registry = StrategyRegistry::with_defaults().unwrap();
    let profile = file.find("strategy-golden-cross").unwrap();
    let cross = registry.configure(&profile.id, profile.params()).unwrap();

    let mut closes = vec![10.0; 8];
    closes.extend([9.0, 9.0, 13.0]);
    let bars = bars_from_closes(&closes);
    assert_eq!(cross.compute_score(&bars), Score::MAX);
    assert_eq!(cross.generate_decision(&bars, &PositionState::flat(1000.0)).action, TradeAction::Buy);
}
