//! C3 — fractal detector.
//!
//! Scans merged-bar triples for local top/bottom extrema (spec.md §4.3).

use crate::bar::{Mark, MergedBar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed local top or bottom over three consecutive merged bars.
///
/// Invariant I2: a fractal always references an interior merged bar (never
/// the first or last element of the merged series it was detected over).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub dt: DateTime<Utc>,
    pub mark: Mark,
    pub price: f64,
    pub high: f64,
    pub low: f64,
}

/// Re-derive the fractal sequence over the tail of `merged` that has not
/// already been confirmed.
///
/// `tail_dt` is `None` on the very first run (scan the whole series) or
/// `Some(last_fractal.dt)` on an incremental re-run (the caller has already
/// dropped its own tentative last fractal and passes the new last
/// confirmed one, per the retrograde-window rule of spec.md §4.1).
pub fn scan_fractals(merged: &[MergedBar], tail_dt: Option<DateTime<Utc>>) -> Vec<Fractal> {
    if merged.len() < 3 {
        return Vec::new();
    }

    let window: Vec<&MergedBar> = match tail_dt {
        None => merged.iter().collect(),
        Some(dt) => merged.iter().filter(|b| b.dt >= dt).collect(),
    };

    let mut out = Vec::new();
    if window.len() < 3 {
        return out;
    }

    for i in 1..window.len() - 1 {
        let k1 = window[i - 1];
        let k2 = window[i];
        let k3 = window[i + 1];

        if k1.high < k2.high && k2.high > k3.high {
            tracing::trace!(dt = %k2.dt, "top fractal");
            out.push(Fractal {
                dt: k2.dt,
                mark: Mark::Top,
                price: k2.high,
                high: k2.high,
                low: k1.low.max(k3.low),
            });
        } else if k1.low > k2.low && k2.low < k3.low {
            tracing::trace!(dt = %k2.dt, "bottom fractal");
            out.push(Fractal {
                dt: k2.dt,
                mark: Mark::Bottom,
                price: k2.low,
                high: k1.high.min(k3.high),
                low: k2.low,
            });
        }
    }

    out
}

/// Re-derive `fractals` over the tail invalidated by newly merged bars.
/// Drops the last fractal (retrograde window) before reprocessing, bounded
/// to the last 100 merged bars once a fractal has already been confirmed.
pub fn update_fractals(fractals: &mut Vec<Fractal>, merged: &[MergedBar]) {
    if merged.len() < 3 {
        return;
    }

    if !fractals.is_empty() {
        fractals.pop();
    }

    let tail_dt = fractals.last().map(|f| f.dt);
    let window: &[MergedBar] = if fractals.is_empty() {
        merged
    } else {
        let start = merged.len().saturating_sub(100);
        &merged[start..]
    };

    fractals.extend(scan_fractals(window, tail_dt));
}
