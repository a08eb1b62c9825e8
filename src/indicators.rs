//! C1 (supplemented) — bar window indicators feeding `to_frame`.
//!
//! Pure functions over `&[f64]`, in the idiom of the pack's streaming
//! indicator helpers: no shared state, output parallel to the input, padded
//! with `f64::NAN` before a window fills.

use std::collections::BTreeMap;

/// Return `val` if finite, otherwise `default`.
#[inline]
fn finite_or(val: f64, default: f64) -> f64 {
    if val.is_finite() {
        val
    } else {
        default
    }
}

/// Simple moving average, one column per period, each parallel to `closes`
/// and left-padded with `f64::NAN` until the window fills.
pub fn ma(closes: &[f64], periods: &[usize]) -> BTreeMap<usize, Vec<f64>> {
    let mut out = BTreeMap::new();
    for &period in periods {
        if period == 0 {
            continue;
        }
        let mut col = vec![f64::NAN; closes.len()];
        if closes.len() >= period {
            for i in period - 1..closes.len() {
                let sum: f64 = closes[i + 1 - period..=i].iter().sum();
                col[i] = finite_or(sum / period as f64, f64::NAN);
            }
        }
        out.insert(period, col);
    }
    out
}

/// Exponential moving average, parallel to `data`, seeded by the simple
/// average of the first `period` elements and `f64::NAN` before that.
fn ema(data: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    if period == 0 || data.len() < period {
        return out;
    }

    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = finite_or(seed, f64::NAN);

    let multiplier = 2.0 / (period as f64 + 1.0);
    for i in period..data.len() {
        let prev = out[i - 1];
        let val = (data[i] - prev) * multiplier + prev;
        out[i] = finite_or(val, prev);
    }
    out
}

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD, each series parallel to `closes`.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(&f, &s)| if f.is_finite() && s.is_finite() { f - s } else { f64::NAN })
        .collect();

    let signal_line = ema(&macd_line, signal);

    let histogram: Vec<f64> = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(&m, &s)| if m.is_finite() && s.is_finite() { m - s } else { f64::NAN })
        .collect();

    MacdSeries {
        macd_line,
        signal_line,
        histogram,
    }
}

#[derive(Debug, Clone)]
pub struct BollSeries {
    pub mid: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Bollinger bands from a rolling mean/stddev over `period`, parallel to
/// `closes`.
pub fn boll(closes: &[f64], period: usize, k: f64) -> BollSeries {
    let n = closes.len();
    let mut mid = vec![f64::NAN; n];
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];

    if period == 0 || n < period {
        return BollSeries { mid, upper, lower };
    }

    for i in period - 1..n {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let stddev = variance.sqrt();
        mid[i] = finite_or(mean, f64::NAN);
        upper[i] = finite_or(mean + k * stddev, f64::NAN);
        lower[i] = finite_or(mean - k * stddev, f64::NAN);
    }

    BollSeries { mid, upper, lower }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ma_pads_with_nan_before_window_fills() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let cols = ma(&closes, &[3]);
        let col = &cols[&3];
        assert!(col[0].is_nan());
        assert!(col[1].is_nan());
        assert_eq!(col[2], 2.0);
        assert_eq!(col[4], 4.0);
    }

    #[test]
    fn ema_seeds_with_sma_of_first_period() {
        let data = [2.0, 4.0, 6.0, 8.0, 10.0];
        let out = ema(&data, 2);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 3.0);
        assert!(out[2].is_finite());
    }

    #[test]
    fn macd_histogram_is_difference_of_lines() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = macd(&closes, 12, 26, 9);
        for i in 0..closes.len() {
            if series.macd_line[i].is_finite() && series.signal_line[i].is_finite() {
                let expected = series.macd_line[i] - series.signal_line[i];
                assert!((series.histogram[i] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn boll_mid_equals_rolling_mean() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let series = boll(&closes, 3, 2.0);
        assert_eq!(series.mid[2], 2.0);
        assert!(series.upper[2] > series.mid[2]);
        assert!(series.lower[2] < series.mid[2]);
    }
}
