use chan_analyzer::RawBar;
use chrono::{DateTime, Duration, Utc};

pub fn base_dt() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Build raw bars from (high, low) pairs with auto-incrementing 1-minute
/// timestamps; each bar is bullish (open = low, close = high).
pub fn make_bars(hl: &[(f64, f64)]) -> Vec<RawBar> {
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

/// Create `n` rising (bullish) bars starting from `start`.
pub fn make_bullish_trend(n: usize, start: f64) -> Vec<RawBar> {
    let base = base_dt();
    (0..n)
        .map(|i| {
            let open = start + i as f64 * 10.0;
            let close = open + 8.0;
            RawBar {
                symbol: "TEST".to_string(),
                dt: base + Duration::minutes(i as i64),
                open,
                high: close + 2.0,
                low: open - 1.0,
                close,
                vol: 100.0,
            }
        })
        .collect()
}

/// Create `n` falling (bearish) bars starting from `start`.
pub fn make_bearish_trend(n: usize, start: f64) -> Vec<RawBar> {
    let base = base_dt();
    (0..n)
        .map(|i| {
            let open = start - i as f64 * 10.0;
            let close = open - 8.0;
            RawBar {
                symbol: "TEST".to_string(),
                dt: base + Duration::minutes(i as i64),
                open,
                high: open + 1.0,
                low: close - 2.0,
                close,
                vol: 100.0,
            }
        })
        .collect()
}
