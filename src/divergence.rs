//! C7 — divergence (背驰) comparator.
//!
//! Compares the MACD-sum "strength" of a recent leg against an earlier one,
//! grounded on `original_source/czsc/analyze.py::is_bei_chi`.

use crate::error::AnalyzerError;
use crate::frame::BarRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A walk's time span, addressed by the [`BarRow`] rows whose `dt` falls
/// inside `[start_dt, end_dt]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub start_dt: DateTime<Utc>,
    pub end_dt: DateTime<Utc>,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Which granularity of leg is being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivergenceMode {
    /// Compare two strokes: sum of `|macd_hist|` over the whole span.
    Bi,
    /// Compare two segments: sum of `|macd_hist|` restricted to the side
    /// matching the leg's direction (negative bars for a down leg, positive
    /// for an up leg).
    Xd,
}

fn rows_in(rows: &[BarRow], leg: &Leg) -> Vec<&BarRow> {
    rows.iter()
        .filter(|r| r.dt >= leg.start_dt && r.dt <= leg.end_dt)
        .collect()
}

fn macd_sum_bi(rows: &[&BarRow]) -> f64 {
    rows.iter().filter_map(|r| r.macd_hist).map(f64::abs).sum()
}

fn macd_sum_xd(rows: &[&BarRow], direction: Direction) -> f64 {
    rows.iter()
        .filter_map(|r| r.macd_hist)
        .filter(|&x| match direction {
            Direction::Down => x < 0.0,
            Direction::Up => x > 0.0,
        })
        .map(f64::abs)
        .sum()
}

/// Does `zs1` (the more recent leg) show divergence against `zs2` (the
/// earlier leg being compared to)?
///
/// `adjust` discounts `zs2`'s strength (recommended range 0.6–1.0); `zs1` is
/// considered divergent when its MACD-sum strength is smaller than `zs2`'s
/// discounted strength.
pub fn is_bei_chi(
    rows: &[BarRow],
    zs1: &Leg,
    zs2: &Leg,
    mode: DivergenceMode,
    adjust: f64,
) -> Result<bool, AnalyzerError> {
    if zs1.start_dt <= zs2.end_dt {
        return Err(AnalyzerError::LegsNotOrdered {
            zs1_start: zs1.start_dt,
            zs2_end: zs2.end_dt,
        });
    }
    if zs1.start_dt >= zs1.end_dt {
        return Err(AnalyzerError::MalformedLeg {
            start_dt: zs1.start_dt,
            end_dt: zs1.end_dt,
        });
    }
    if zs2.start_dt >= zs2.end_dt {
        return Err(AnalyzerError::MalformedLeg {
            start_dt: zs2.start_dt,
            end_dt: zs2.end_dt,
        });
    }

    let k1 = rows_in(rows, zs1);
    let k2 = rows_in(rows, zs2);

    let (macd_sum1, macd_sum2) = match mode {
        DivergenceMode::Bi => (macd_sum_bi(&k1), macd_sum_bi(&k2)),
        DivergenceMode::Xd => (
            macd_sum_xd(&k1, zs1.direction),
            macd_sum_xd(&k2, zs2.direction),
        ),
    };

    let bc = macd_sum1 < macd_sum2 * adjust;
    tracing::trace!(?mode, macd_sum1, macd_sum2, adjust, bc, "divergence check");
    Ok(bc)
}
