//! Bar-builder helpers shared by this crate's unit tests, in the teacher's
//! `test_helpers.rs` style — not part of the public API.

use crate::bar::{MergedBar, RawBar};
use chrono::{DateTime, Duration, Utc};

pub fn base_dt() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Build raw bars from (high, low) pairs, auto-incrementing 1-minute
/// timestamps; each bar is bullish (open = low, close = high).
pub fn raw_bars(hl: &[(f64, f64)]) -> Vec<RawBar> {
    let base = base_dt();
    hl.iter()
        .enumerate()
        .map(|(i, &(h, l))| RawBar {
            symbol: "TEST".to_string(),
            dt: base + Duration::minutes(i as i64),
            open: l,
            high: h,
            low: l,
            close: h,
            vol: 100.0,
        })
        .collect()
}

/// Same as [`raw_bars`] but from (open, high, low, close) tuples.
pub fn raw_bars_ohlc(ohlc: &[(f64, f64, f64, f64)]) -> Vec<RawBar> {
    let base = base_dt();
    ohlc.iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| RawBar {
            symbol: "TEST".to_string(),
            dt: base + Duration::minutes(i as i64),
            open: o,
            high: h,
            low: l,
            close: c,
            vol: 100.0,
        })
        .collect()
}

/// Build already-merged bars directly from (high, low) pairs, skipping C2 —
/// useful for testing C3/C4/C5 in isolation.
pub fn merged_from_hl(hl: &[(f64, f64)]) -> Vec<MergedBar> {
    let base = base_dt();
    hl.iter()
        .enumerate()
        .map(|(i, &(h, l))| MergedBar {
            dt: base + Duration::minutes(i as i64),
            open: l,
            high: h,
            low: l,
            close: h,
            vol: 100.0,
        })
        .collect()
}
