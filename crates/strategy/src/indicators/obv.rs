use common::Bar;

/// On-balance volume. Starts at zero and adds or subtracts each bar's volume
/// according to the close-to-close direction; unchanged closes leave it flat.
pub fn obv(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut running = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let prev = bars[i - 1].close;
            if bar.close > prev {
                running += bar.volume;
            } else if bar.close < prev {
                running -= bar.volume;
            }
        }
        out.push(running);
    }
    out
}
