use chrono::{DateTime, Utc};

/// Errors surfaced by the analyzer's public entry points.
///
/// Data-shortage is deliberately *not* a variant here: when a stage doesn't
/// have enough input yet (fewer than 4 raw bars, 3 merged bars, 2 fractals,
/// 4 strokes) it silently leaves its sequence empty instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("out-of-order bar: new dt {new_dt} is not after last dt {last_dt}")]
    OutOfOrderBar {
        new_dt: DateTime<Utc>,
        last_dt: DateTime<Utc>,
    },

    #[error("malformed leg: start_dt {start_dt} must be before end_dt {end_dt}")]
    MalformedLeg {
        start_dt: DateTime<Utc>,
        end_dt: DateTime<Utc>,
    },

    #[error("zs1 must be the more recent leg: zs1.start_dt ({zs1_start}) must be after zs2.end_dt ({zs2_end})")]
    LegsNotOrdered {
        zs1_start: DateTime<Utc>,
        zs2_end: DateTime<Utc>,
    },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}
