use common::Bar;

use super::{check_period, true_range, IndicatorError, Series};

/// Average Directional Index with its directional indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct AdxSeries {
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
}

/// ADX (trend strength) with +DI / −DI.
///
/// +DM, −DM and TR are accumulated as Wilder running sums seeded with the
/// first `period` moves, so the DI lines start at bar `period`. ADX is the
/// mean of the trailing `period` DX values and starts at bar `2 * period - 1`.
pub fn adx(bars: &[Bar], period: usize) -> Result<AdxSeries, IndicatorError> {
    check_period("ADX", period)?;
    let n = bars.len();
    let mut out = AdxSeries {
        adx: vec![None; n],
        plus_di: vec![None; n],
        minus_di: vec![None; n],
    };
    if n < period + 1 {
        return Ok(out);
    }

    // Directional movement and true range per move; index j covers bar j + 1.
    let tr_all = true_range(bars);
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for w in bars.windows(2) {
        let up = w[1].high - w[0].high;
        let down = w[0].low - w[1].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }
    let tr = &tr_all[1..];

    let p = period as f64;
    let mut s_plus: f64 = plus_dm[..period].iter().sum();
    let mut s_minus: f64 = minus_dm[..period].iter().sum();
    let mut s_tr: f64 = tr[..period].iter().sum();
    let mut dx_values: Vec<f64> = Vec::with_capacity(n);

    for j in (period - 1)..plus_dm.len() {
        if j >= period {
            s_plus = s_plus - s_plus / p + plus_dm[j];
            s_minus = s_minus - s_minus / p + minus_dm[j];
            s_tr = s_tr - s_tr / p + tr[j];
        }

        let (plus_di, minus_di) = if s_tr > 0.0 {
            (s_plus / s_tr * 100.0, s_minus / s_tr * 100.0)
        } else {
            (0.0, 0.0)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            (plus_di - minus_di).abs() / di_sum * 100.0
        } else {
            0.0
        };
        dx_values.push(dx);

        let bar_index = j + 1;
        out.plus_di[bar_index] = Some(plus_di);
        out.minus_di[bar_index] = Some(minus_di);
        if dx_values.len() >= period {
            let tail = &dx_values[dx_values.len() - period..];
            out.adx[bar_index] = Some(tail.iter().sum::<f64>() / p);
        }
    }

    Ok(out)
}
