use common::{closes, Bar, DecisionResult, PositionState, Score, StrategyCategory};

use super::{ensure_bars, last_bar};
use crate::indicators::{last, nth_back, rsi};
use crate::{Strategy, StrategyError, StrategyParams};

/// Fast scalping entries on a volume spike backed by RSI momentum.
pub struct ScoutBreakout;

const RSI_LOWER_BOUND: f64 = 30.0;
const RSI_UPPER_BOUND: f64 = 70.0;

struct Config {
    rsi_period: usize,
    volume_period: usize,
    volume_multiplier: f64,
}

impl Config {
    fn from(params: &StrategyParams) -> Self {
        Self {
            rsi_period: params.get_or("rsiPeriod", 14),
            volume_period: params.get_or("volPeriod", 20),
            volume_multiplier: params.get_or("volMult", 1.8),
        }
    }

    fn min_bars(&self) -> usize {
        self.volume_period.max(self.rsi_period).saturating_add(1)
    }
}

/// RSI and volume readings shared by decisions and scoring.
struct Snapshot {
    rsi: f64,
    prev_rsi: Option<f64>,
    volume_ratio: f64,
    volume_spike: bool,
}

impl Snapshot {
    fn take(bars: &[Bar], cfg: &Config) -> Result<Self, StrategyError> {
        ensure_bars(bars, cfg.min_bars())?;
        let series = rsi(&closes(bars), cfg.rsi_period)?;
        let last_volume = last_bar(bars)?.volume;

        // Average of the volumes preceding the last bar
        let end = bars.len() - 1;
        let window = &bars[end - cfg.volume_period..end];
        let avg_volume = window.iter().map(|b| b.volume).sum::<f64>() / window.len().max(1) as f64;

        Ok(Self {
            rsi: last(&series).unwrap_or(50.0),
            prev_rsi: nth_back(&series, 1),
            volume_ratio: last_volume / if avg_volume > 0.0 { avg_volume } else { 1.0 },
            volume_spike: last_volume > avg_volume * cfg.volume_multiplier,
        })
    }
}

impl Strategy for ScoutBreakout {
    fn id(&self) -> &'static str {
        "strategy-scout-breakout"
    }

    fn name(&self) -> &'static str {
        "Scout Breakout (Volume & RSI)"
    }

    fn description(&self) -> &'static str {
        "Enters on a volume spike while RSI breaks out above 50 or recovers from oversold. Quick 3% target, 2% stop."
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Trading
    }

    fn min_bars(&self, params: &StrategyParams) -> usize {
        Config::from(params).min_bars()
    }

    fn neutral_score(&self) -> Score {
        Score::NEUTRAL
    }

    fn decide(
        &self,
        bars: &[Bar],
        position: &PositionState,
        params: &StrategyParams,
    ) -> Result<DecisionResult, StrategyError> {
        let cfg = Config::from(params);
        let snap = Snapshot::take(bars, &cfg)?;
        let price = last_bar(bars)?.close;
        let rsi_now = snap.rsi;

        let decision = if position.is_flat() {
            let rsi_breakout = rsi_now > 50.0 && rsi_now < RSI_UPPER_BOUND;
            let oversold_recovery =
                rsi_now > RSI_LOWER_BOUND && snap.prev_rsi.is_some_and(|p| p <= RSI_LOWER_BOUND);

            if snap.volume_spike && (rsi_breakout || oversold_recovery) {
                let reason = if rsi_breakout {
                    format!("Volume spike with RSI breakout ({rsi_now:.1})")
                } else {
                    format!("Volume spike with oversold recovery ({rsi_now:.1})")
                };
                DecisionResult::buy(reason)
                    .with_target(price * 1.03)
                    .with_stop(price * 0.98)
            } else if snap.volume_spike && rsi_now >= RSI_UPPER_BOUND {
                DecisionResult::none(format!("Volume strong but RSI ({rsi_now:.1}) overbought"))
            } else if snap.volume_spike {
                DecisionResult::none(format!("Volume spike, waiting for trend confirmation (RSI {rsi_now:.1})"))
            } else if rsi_now < 30.0 {
                DecisionResult::none("Oversold, waiting for volume")
            } else {
                DecisionResult::none("No volume spike")
            }
        } else if rsi_now > 75.0 {
            DecisionResult::sell("Target reached (overbought)")
        } else if !snap.volume_spike && rsi_now < 50.0 {
            DecisionResult::sell("Momentum lost")
        } else {
            DecisionResult::none("Holding")
        };

        Ok(decision
            .with_indicator("RSI", rsi_now)
            .with_indicator("VolumeRatio", snap.volume_ratio))
    }

    fn score(&self, bars: &[Bar], params: &StrategyParams) -> Result<Score, StrategyError> {
        let snap = Snapshot::take(bars, &Config::from(params))?;
        let mut score = 50.0;

        // Volume contributes up to 45 points
        if snap.volume_ratio > 1.0 {
            score += (snap.volume_ratio * 15.0).min(45.0);
        }

        let rsi_now = snap.rsi;
        if rsi_now > 50.0 && rsi_now < 70.0 {
            score += 15.0;
            if rsi_now > 60.0 {
                score += 10.0;
            }
        } else if rsi_now > 70.0 {
            score += 5.0;
        } else if rsi_now < 35.0 {
            score += 10.0;
        }

        Ok(Score::new(score))
    }
}
