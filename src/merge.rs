//! C2 — containment merger.
//!
//! Maintains the containment-free bar series (spec.md §4.2). Containment
//! merging is not associative across direction changes, which is why the
//! seed is the first four raw bars copied as-is rather than folded one at a
//! time from an empty series.

use crate::bar::{MergedBar, RawBar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Re-derive `merged` over the tail invalidated by new/changed bars in `raw`.
///
/// Drops the last 2 merged bars (the retrograde window, spec.md §4.1), then
/// reprocesses every raw bar whose `dt` is after the new tail — bounded to
/// the last 100 raw bars once the merged series has grown past the seed.
pub fn update_merged(merged: &mut Vec<MergedBar>, raw: &[RawBar]) {
    if merged.is_empty() {
        if raw.len() < 4 {
            return;
        }
        merged.extend(raw[..4].iter().cloned().map(MergedBar::from));
    }

    let drop = merged.len().min(2);
    merged.truncate(merged.len() - drop);

    if merged.is_empty() {
        return;
    }

    let last_dt = merged.last().unwrap().dt;
    let search_space: &[RawBar] = if merged.len() <= 4 {
        raw
    } else {
        let start = raw.len().saturating_sub(100);
        &raw[start..]
    };

    for cur in search_space.iter().filter(|b| b.dt > last_dt) {
        push_raw_bar(merged, cur);
    }
}

fn push_raw_bar(merged: &mut Vec<MergedBar>, cur: &RawBar) {
    if merged.len() < 2 {
        merged.push(MergedBar::from(cur.clone()));
        return;
    }

    let direction = if merged[merged.len() - 1].high > merged[merged.len() - 2].high {
        Direction::Up
    } else {
        Direction::Down
    };

    let last = *merged.last().unwrap();
    let contained = (cur.high <= last.high && cur.low >= last.low)
        || (cur.high >= last.high && cur.low <= last.low);

    if !contained {
        merged.push(MergedBar::from(cur.clone()));
        return;
    }

    merged.pop();
    let (high, low) = match direction {
        Direction::Up => (last.high.max(cur.high), last.low.max(cur.low)),
        Direction::Down => (last.high.min(cur.high), last.low.min(cur.low)),
    };
    // Preserve the bullish/bearish color of the incoming bar.
    let (open, close) = if cur.open >= cur.close {
        (high, low)
    } else {
        (low, high)
    };
    tracing::trace!(dt = %cur.dt, ?direction, "containment merge");
    merged.push(MergedBar {
        dt: cur.dt,
        open,
        high,
        low,
        close,
        vol: cur.vol,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::raw_bars;

    #[test]
    fn ascending_staircase_has_no_containment() {
        let data: Vec<(f64, f64)> = (0..20).map(|i| (10.0 + i as f64, 9.0 + i as f64)).collect();
        let raw = raw_bars(&data);
        let mut merged = Vec::new();
        update_merged(&mut merged, &raw);
        assert_eq!(merged.len(), raw.len());
        for w in merged.windows(2) {
            let (a, b) = (w[0], w[1]);
            let contained =
                (b.high <= a.high && b.low >= a.low) || (b.high >= a.high && b.low <= a.low);
            assert!(!contained);
        }
    }

    #[test]
    fn containment_merges_down_direction() {
        // Three bars, the third contained in the second; direction is "down"
        // because the second bar's high (14) is below the first's (15).
        let raw = raw_bars(&[(15.0, 13.0), (14.0, 12.0), (13.5, 12.5)]);
        let mut merged = Vec::new();
        update_merged(&mut merged, &raw);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].high, 13.5);
        assert_eq!(merged[1].low, 12.0);
    }

    #[test]
    fn no_adjacent_containment_after_update(
    ) {
        let data = vec![
            (15.0, 13.0),
            (14.0, 12.0),
            (13.5, 12.5),
            (16.0, 13.0),
            (17.0, 16.5),
            (15.0, 14.5),
        ];
        let raw = raw_bars(&data);
        let mut merged = Vec::new();
        update_merged(&mut merged, &raw);
        for w in merged.windows(2) {
            let (a, b) = (w[0], w[1]);
            let contained =
                (b.high <= a.high && b.low >= a.low) || (b.high >= a.high && b.low <= a.low);
            assert!(!contained, "containment survived between {:?} and {:?}", a, b);
        }
    }
}
