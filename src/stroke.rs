//! C4 — stroke (笔) builder.
//!
//! Promotes fractals to confirmed strokes under the consolidation /
//! minimum-length / non-overlap rules of spec.md §4.4.

use crate::bar::{Mark, MergedBar};
use crate::fractal::Fractal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed monotone leg endpoint, promoted from a [`Fractal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub dt: DateTime<Utc>,
    pub mark: Mark,
    pub price: f64,
    pub high: f64,
    pub low: f64,
}

impl From<Fractal> for Stroke {
    fn from(f: Fractal) -> Self {
        Stroke {
            dt: f.dt,
            mark: f.mark,
            price: f.price,
            high: f.high,
            low: f.low,
        }
    }
}

/// Re-derive `strokes` over the tail invalidated by newly confirmed
/// fractals. Drops the last stroke (retrograde window) before reprocessing.
pub fn update_strokes(
    strokes: &mut Vec<Stroke>,
    fractals: &[Fractal],
    merged: &[MergedBar],
    min_bi_k: usize,
) {
    if fractals.len() < 2 {
        return;
    }

    if strokes.is_empty() {
        strokes.extend(fractals[..2].iter().copied().map(Stroke::from));
    }

    if !strokes.is_empty() {
        strokes.truncate(strokes.len() - 1);
    }
    if strokes.is_empty() {
        return;
    }

    let seed_dt = strokes.last().unwrap().dt;
    let (fx_window, kn_window): (&[Fractal], &[MergedBar]) = if strokes.len() <= 2 {
        (fractals, merged)
    } else {
        let fx_start = fractals.len().saturating_sub(100);
        let kn_start = merged.len().saturating_sub(500);
        (&fractals[fx_start..], &merged[kn_start..])
    };
    let right_fx: Vec<&Fractal> = fx_window.iter().filter(|f| f.dt > seed_dt).collect();

    for fx in right_fx {
        let last = *strokes.last().unwrap();
        if fx.mark == last.mark {
            let extends = (last.mark == Mark::Top && fx.price > last.price)
                || (last.mark == Mark::Bottom && fx.price < last.price);
            if extends {
                tracing::trace!(from = ?last, to = ?fx, "stroke mark pulled");
                *strokes.last_mut().unwrap() = Stroke::from(*fx);
            }
            continue;
        }

        let inside = kn_window
            .iter()
            .filter(|b| b.dt >= last.dt && b.dt <= fx.dt)
            .count();
        if inside < min_bi_k {
            continue;
        }

        let non_overlap = (last.mark == Mark::Top && fx.high < last.low)
            || (last.mark == Mark::Bottom && fx.low > last.high);
        if non_overlap {
            tracing::trace!(stroke = ?fx, "new stroke");
            strokes.push(Stroke::from(*fx));
        }
    }

    invalidate_broken_tail(strokes, merged);
}

/// Pop the last stroke if subsequent price action has broken it (spec.md
/// §4.4 tail validity).
fn invalidate_broken_tail(strokes: &mut Vec<Stroke>, merged: &[MergedBar]) {
    let Some(last) = strokes.last().copied() else {
        return;
    };
    let broken = merged.iter().filter(|b| b.dt > last.dt).any(|b| {
        (last.mark == Mark::Bottom && b.low < last.price)
            || (last.mark == Mark::Top && b.high > last.price)
    });
    if broken {
        tracing::trace!(stroke = ?last, "stroke invalidated by later price action");
        strokes.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::scan_fractals;
    use crate::test_support::merged_from_hl;

    #[test]
    fn minimum_length_rejects_short_leg() {
        // Bottom fractal, top fractal only 3 merged bars apart; min_bi_k=5.
        let merged = merged_from_hl(&[
            (11.0, 10.0),
            (10.0, 8.0), // bottom fractal here
            (11.0, 9.0),
            (13.0, 11.0), // top fractal here
            (12.0, 10.0),
        ]);
        let fractals = scan_fractals(&merged, None);
        assert_eq!(fractals.len(), 2);

        let mut strokes = Vec::new();
        update_strokes(&mut strokes, &fractals, &merged, 5);
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].mark, fractals[0].mark);
    }

    #[test]
    fn strict_alternation_holds() {
        let data: Vec<(f64, f64)> = vec![
            (10.0, 9.0),
            (12.0, 10.0),
            (14.0, 12.0),
            (12.0, 10.0),
            (10.0, 8.0),
            (9.0, 7.0),
            (8.0, 6.0),
            (10.0, 8.0),
            (13.0, 11.0),
            (15.0, 13.0),
            (13.0, 11.0),
            (11.0, 9.0),
            (10.0, 8.0),
            (9.0, 7.0),
        ];
        let merged = merged_from_hl(&data);
        let fractals = scan_fractals(&merged, None);
        let mut strokes = Vec::new();
        update_strokes(&mut strokes, &fractals, &merged, 2);
        for w in strokes.windows(2) {
            assert_ne!(w[0].mark, w[1].mark);
        }
    }
}
