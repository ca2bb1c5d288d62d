use serde::{Deserialize, Serialize};

use super::{check_order, ema, last, nth_back, IndicatorError};

/// Fast/slow EMA relationship on the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EmaCross {
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    /// Fast crossed above slow on the latest bar.
    pub is_golden_cross: bool,
    /// Fast crossed below slow on the latest bar.
    pub is_death_cross: bool,
}

/// Edge-triggered EMA crossover: compares the latest bar against the previous
/// one. Both flags are false while either EMA is still warming up.
///
/// The previous bar must sit strictly on the other side (`<` for golden,
/// `>` for death). A previous bar where the EMAs touch does not count here,
/// unlike the strategies' `crossed_above` / `crossed_below`, which accept it.
pub fn detect_ema_cross(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
) -> Result<EmaCross, IndicatorError> {
    check_order("fast EMA", fast_period, "slow EMA", slow_period)?;
    let fast = ema(closes, fast_period)?;
    let slow = ema(closes, slow_period)?;

    let mut cross = EmaCross {
        fast_ema: last(&fast),
        slow_ema: last(&slow),
        ..EmaCross::default()
    };
    if let (Some(f), Some(s), Some(pf), Some(ps)) = (
        cross.fast_ema,
        cross.slow_ema,
        nth_back(&fast, 1),
        nth_back(&slow, 1),
    ) {
        cross.is_golden_cross = pf < ps && f > s;
        cross.is_death_cross = pf > ps && f < s;
    }
    Ok(cross)
}
