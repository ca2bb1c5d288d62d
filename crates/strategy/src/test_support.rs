use chrono::{DateTime, Duration, Utc};

use common::Bar;

pub fn time(i: usize) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::hours(i as i64)
}

pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar {
        open_time: time(i),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Bars whose OHLC all equal the close, with a constant volume.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i, c, c, c, c, 1000.0))
        .collect()
}
