use super::{check_period, sma, IndicatorError, Series};

/// Bollinger bands around an SMA, using the population standard deviation.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn bollinger_bands(
    closes: &[f64],
    period: usize,
    std_dev: f64,
) -> Result<BollingerBands, IndicatorError> {
    check_period("Bollinger", period)?;
    let middle = sma(closes, period)?;
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];

    for (i, mean) in middle.iter().enumerate() {
        let Some(mean) = *mean else { continue };
        let window = &closes[i + 1 - period..=i];
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let sd = variance.sqrt();
        upper[i] = Some(mean + std_dev * sd);
        lower[i] = Some(mean - std_dev * sd);
    }

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}

/// Band width relative to the middle band, in percent.
/// `None` where the bands are warming up or the middle band is zero.
pub fn bollinger_bandwidth(
    closes: &[f64],
    period: usize,
    std_dev: f64,
) -> Result<Series, IndicatorError> {
    let bands = bollinger_bands(closes, period, std_dev)?;
    Ok(bands
        .upper
        .iter()
        .zip(&bands.middle)
        .zip(&bands.lower)
        .map(|((u, m), l)| {
            let (u, m, l) = ((*u)?, (*m)?, (*l)?);
            (m != 0.0).then(|| (u - l) / m * 100.0)
        })
        .collect())
}
