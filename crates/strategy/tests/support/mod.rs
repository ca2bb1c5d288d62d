#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use common::Bar;

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
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

/// Bars from `(close, spread, volume)` triples. The open is the previous
/// close and the high/low straddle the body by `spread`.
pub fn bars_from_moves(moves: &[(f64, f64, f64)]) -> Vec<Bar> {
    let mut prev_close = moves.first().map_or(0.0, |m| m.0);
    moves
        .iter()
        .enumerate()
        .map(|(i, &(close, spread, volume))| {
            let open = prev_close;
            prev_close = close;
            Bar {
                open_time: DateTime::<Utc>::UNIX_EPOCH + Duration::hours(i as i64),
                open,
                high: open.max(close) + spread,
                low: (open.min(close) - spread).max(0.0),
                close,
                volume,
            }
        })
        .collect()
}
