//! Concrete strategy variants.

mod alpha_trend;
mod breakout_hunter;
mod dca;
mod divergence_detector;
mod golden_cross;
mod golden_rose;
mod grid;
mod market_buy;
mod multi_ma_breakout;
mod oversold_recovery;
mod phoenix_momentum;
mod scout_breakout;
mod simulation;
mod sma_breakout;
mod sma111_breakout;
mod sma111_buy_sell;
mod trend_surfer;
mod whale_accumulation;

pub use alpha_trend::AlphaTrend;
pub use breakout_hunter::BreakoutHunter;
pub use dca::Dca;
pub use divergence_detector::DivergenceDetector;
pub use golden_cross::GoldenCross;
pub use golden_rose::GoldenRose;
pub use grid::Grid;
pub use market_buy::MarketBuy;
pub use multi_ma_breakout::MultiMaBreakout;
pub use oversold_recovery::OversoldRecovery;
pub use phoenix_momentum::PhoenixMomentum;
pub use scout_breakout::ScoutBreakout;
pub use simulation::Simulation;
pub use sma_breakout::SmaBreakout;
pub use sma111_breakout::Sma111Breakout;
pub use sma111_buy_sell::Sma111BuySell;
pub use trend_surfer::TrendSurfer;
pub use whale_accumulation::WhaleAccumulation;

use std::sync::Arc;

use common::{volumes, Bar};

use crate::indicators::{last, sma};
use crate::{Strategy, StrategyError};

/// Every built-in strategy, in registration order.
pub fn builtin() -> Vec<Arc<dyn Strategy>> {
    vec![
        Arc::new(GoldenRose),
        Arc::new(Dca),
        Arc::new(Simulation),
        Arc::new(MarketBuy),
        Arc::new(Grid),
        Arc::new(AlphaTrend),
        Arc::new(PhoenixMomentum),
        Arc::new(SmaBreakout),
        Arc::new(Sma111Breakout),
        Arc::new(Sma111BuySell),
        Arc::new(WhaleAccumulation),
        Arc::new(ScoutBreakout),
        Arc::new(BreakoutHunter),
        Arc::new(DivergenceDetector),
        Arc::new(TrendSurfer),
        Arc::new(GoldenCross),
        Arc::new(OversoldRecovery),
        Arc::new(MultiMaBreakout),
    ]
}

// ─── Shared helpers ───────────────────────────────────────────────────────────

pub(crate) fn last_bar(bars: &[Bar]) -> Result<&Bar, StrategyError> {
    bars.last().ok_or(StrategyError::InsufficientData {
        required: 1,
        available: 0,
    })
}

pub(crate) fn ensure_bars(bars: &[Bar], required: usize) -> Result<(), StrategyError> {
    if bars.len() < required {
        return Err(StrategyError::InsufficientData {
            required,
            available: bars.len(),
        });
    }
    Ok(())
}

/// Latest SMA of volume. `None` while it warms up.
pub(crate) fn volume_average(bars: &[Bar], period: usize) -> Result<Option<f64>, StrategyError> {
    Ok(last(&sma(&volumes(bars), period)?))
}

/// Last volume relative to its SMA. `None` while the SMA warms up or is zero.
pub(crate) fn volume_ratio(bars: &[Bar], period: usize) -> Result<Option<f64>, StrategyError> {
    let last_volume = last_bar(bars)?.volume;
    Ok(volume_average(bars, period)?
        .filter(|avg| *avg > 0.0)
        .map(|avg| last_volume / avg))
}

/// `a` crossed above `b` between the previous and the current bar.
pub(crate) fn crossed_above(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a <= prev_b && a > b
}

/// `a` crossed below `b` between the previous and the current bar.
pub(crate) fn crossed_below(prev_a: f64, prev_b: f64, a: f64, b: f64) -> bool {
    prev_a >= prev_b && a < b
}
