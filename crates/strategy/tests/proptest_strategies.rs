mod support;

use common::{PositionState, TradeAction};
use proptest::prelude::*;
use strategy::{Strategy as _, StrategyParams, StrategyRegistry};
use support::bars_from_moves;

fn moves() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((1.0f64..1_000.0, 0.0f64..10.0, 0.0f64..1e6), 0..260)
}

fn position() -> impl Strategy<Value = PositionState> {
    prop_oneof![
        (1.0f64..10_000.0).prop_map(PositionState::flat),
        (0.001f64..100.0, 0.0f64..1_000.0, 0u32..8)
            .prop_map(|(size, entry, step)| PositionState::open(size, entry).with_step(step)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every registered strategy returns a decision and an in-range score for
    /// arbitrary histories, and scoring is repeatable.
    #[test]
    fn strategies_are_total_and_deterministic(moves in moves(), position in position()) {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let bars = bars_from_moves(&moves);

        for id in registry.ids() {
            let configured = registry.configure(id, StrategyParams::new()).unwrap();

            let score = configured.compute_score(&bars);
            prop_assert!((0.0..=100.0).contains(&score.value()), "{id}: {score}");
            prop_assert_eq!(score, configured.compute_score(&bars), "{} score not repeatable", id);

            let decision = configured.generate_decision(&bars, &position);
            let again = configured.generate_decision(&bars, &position);
            prop_assert_eq!(format!("{decision:?}"), format!("{again:?}"));
            if let Some(last) = bars.last() {
                prop_assert_eq!(decision.reference_price, Some(last.close));
                prop_assert_eq!(decision.reference_time, Some(last.open_time));
            }
        }
    }

    /// Below the minimum look-back every strategy stays out and reports its
    /// neutral score.
    #[test]
    fn short_history_is_neutral(moves in moves()) {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let bars = bars_from_moves(&moves);

        for strategy in registry.all() {
            let params = StrategyParams::new();
            let configured = registry.configure(strategy.id(), params.clone()).unwrap();

            if bars.len() < strategy.min_score_bars(&params).max(1) {
                prop_assert_eq!(configured.compute_score(&bars), strategy.neutral_score());
            }
            if bars.len() < strategy.min_bars(&params).max(1) {
                let decision = configured.generate_decision(&bars, &PositionState::flat(1000.0));
                prop_assert_eq!(decision.action, TradeAction::None);
            }
        }
    }

    /// Unparseable parameter values fall back to defaults instead of failing.
    #[test]
    fn garbage_parameters_fall_back(moves in moves(), junk in "[xyz]{1,8}") {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let bars = bars_from_moves(&moves);

        for id in registry.ids() {
            let defaults = registry.configure(id, StrategyParams::new()).unwrap();
            let params = ["RsiPeriod", "rsiPeriod", "period", "volMult", "sma1", "dcaCount", "BbPeriod"]
                .into_iter()
                .fold(StrategyParams::new(), |p, key| p.with(key, &junk));
            let junked = registry.configure(id, params).unwrap();
            prop_assert_eq!(defaults.compute_score(&bars), junked.compute_score(&bars), "{}", id);
        }
    }

    /// Integer parameters at the edge of `usize` never escape the evaluation
    /// boundary, whether they overflow a look-back or break an indicator.
    #[test]
    fn extreme_periods_stay_contained(
        moves in moves(),
        extreme in prop_oneof![
            Just(usize::MAX),
            Just(usize::MAX - 1),
            Just(0usize),
            (10_001usize..usize::MAX),
        ],
    ) {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let bars = bars_from_moves(&moves);
        let params = PERIOD_KEYS
            .into_iter()
            .fold(StrategyParams::new(), |p, key| p.with(key, extreme));

        for id in registry.ids() {
            let configured = registry.configure(id, params.clone()).unwrap();
            let score = configured.compute_score(&bars);
            prop_assert!((0.0..=100.0).contains(&score.value()), "{id}: {score}");
            let decision = configured.generate_decision(&bars, &PositionState::open(1.0, 100.0));
            if let Some(last) = bars.last() {
                prop_assert_eq!(decision.reference_price, Some(last.close));
            }
        }
    }
}

/// Every integer look-back or count parameter read by a built-in strategy.
const PERIOD_KEYS: [&str; 19] = [
    "AdxPeriod",
    "AtrPeriod",
    "BbPeriod",
    "DivergenceLookback",
    "FastEmaPeriod",
    "ObvSmaPeriod",
    "RsiPeriod",
    "SlowEmaPeriod",
    "StochRsiPeriod",
    "fastEma",
    "slowEma",
    "rsiPeriod",
    "volPeriod",
    "gridCount",
    "longPeriod",
    "shortPeriod",
    "period",
    "sma1",
    "sma2",
];
