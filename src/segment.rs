//! C5 — segment (线段) builder.
//!
//! Builds higher-order legs from strokes under the two-case (gap / no-gap)
//! confirmation rule of spec.md §4.5.

use crate::bar::{Mark, MergedBar};
use crate::error::AnalyzerError;
use crate::stroke::Stroke;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed higher-order leg endpoint, coinciding with a [`Stroke`]
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub dt: DateTime<Utc>,
    pub mark: Mark,
    pub price: f64,
}

impl From<Stroke> for Segment {
    fn from(s: Stroke) -> Self {
        Segment {
            dt: s.dt,
            mark: s.mark,
            price: s.price,
        }
    }
}

/// Re-derive `segments` over the tail invalidated by newly confirmed
/// strokes. Drops the last 2 segments (retrograde window) before
/// reprocessing.
pub fn update_segments(
    segments: &mut Vec<Segment>,
    strokes: &[Stroke],
    merged: &[MergedBar],
) -> Result<(), AnalyzerError> {
    if strokes.len() < 4 {
        return Ok(());
    }

    let drop = segments.len().min(2);
    segments.truncate(segments.len() - drop);

    if segments.is_empty() {
        segments.extend(strokes[..3].iter().copied().map(Segment::from));
    }

    let seed_dt = segments.last().unwrap().dt;
    let stroke_window: &[Stroke] = if segments.len() <= 3 {
        strokes
    } else {
        let start = strokes.len().saturating_sub(200);
        &strokes[start..]
    };
    let right_bi: Vec<&Stroke> = stroke_window.iter().filter(|s| s.dt >= seed_dt).collect();

    let bi_d: Vec<&Stroke> = right_bi.iter().copied().filter(|s| s.mark == Mark::Bottom).collect();
    let bi_g: Vec<&Stroke> = right_bi.iter().copied().filter(|s| s.mark == Mark::Top).collect();

    let mut candidates: Vec<&Stroke> = Vec::new();
    for w in bi_d.windows(3) {
        if w[0].price > w[1].price && w[1].price < w[2].price {
            candidates.push(w[1]);
        }
    }
    for w in bi_g.windows(3) {
        if w[0].price < w[1].price && w[1].price > w[2].price {
            candidates.push(w[1]);
        }
    }
    candidates.sort_by_key(|s| s.dt);

    for xp in candidates {
        let last = *segments.last().unwrap();

        if xp.mark == last.mark {
            let extends = (last.mark == Mark::Bottom && xp.price < last.price)
                || (last.mark == Mark::Top && xp.price > last.price);
            if extends {
                *segments.last_mut().unwrap() = Segment::from(*xp);
            }
            continue;
        }

        let inside: Vec<&Stroke> = right_bi
            .iter()
            .copied()
            .filter(|s| s.dt > last.dt && s.dt <= xp.dt)
            .collect();
        let n = inside.len();
        if n < 4 {
            continue;
        }
        if n > 4 {
            tracing::trace!(segment = ?xp, "new segment (>4 strokes inside)");
            segments.push(Segment::from(*xp));
            continue;
        }

        // n == 4: two-case rule.
        let bi_r: Vec<&Stroke> = right_bi.iter().copied().filter(|s| s.dt >= xp.dt).collect();
        if bi_r.len() < 2 {
            continue;
        }
        let characteristic = bi_r[1];
        let third_from_last = inside[inside.len() - 3];
        let second_from_last = inside[inside.len() - 2];

        if characteristic.mark != second_from_last.mark {
            return Err(AnalyzerError::InternalInvariantViolation(format!(
                "segment two-case rule saw mismatched marks: {:?} vs {:?}",
                characteristic.mark, second_from_last.mark
            )));
        }

        let no_gap = (characteristic.mark == Mark::Top && characteristic.price > third_from_last.price)
            || (characteristic.mark == Mark::Bottom && characteristic.price < third_from_last.price);
        if no_gap {
            tracing::trace!(segment = ?xp, "new segment (case 1: no gap)");
            segments.push(Segment::from(*xp));
            continue;
        }

        let with_gap = (characteristic.mark == Mark::Top && characteristic.price < second_from_last.price)
            || (characteristic.mark == Mark::Bottom && characteristic.price > second_from_last.price);
        if with_gap {
            tracing::trace!(segment = ?xp, "new segment (case 2: with gap)");
            segments.push(Segment::from(*xp));
        }
    }

    invalidate_broken_tail(segments, merged);
    Ok(())
}

fn invalidate_broken_tail(segments: &mut Vec<Segment>, merged: &[MergedBar]) {
    let Some(last) = segments.last().copied() else {
        return;
    };
    let broken = merged.iter().filter(|b| b.dt > last.dt).any(|b| {
        (last.mark == Mark::Bottom && b.low < last.price)
            || (last.mark == Mark::Top && b.high > last.price)
    });
    if broken {
        tracing::trace!(segment = ?last, "segment invalidated by later price action");
        segments.pop();
    }
}
