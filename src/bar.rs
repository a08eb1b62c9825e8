use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single raw OHLCV bar as produced by a data-source adapter (out of
/// scope for this crate — see the `Exchange`-shaped collaborator referenced
/// only by doc comment in [`crate::analyzer`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub symbol: String,
    pub dt: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,
}

impl RawBar {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// A containment-free bar produced by the merger (C2). Carries no `symbol`
/// field — a merged bar may straddle several raw bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedBar {
    pub dt: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,
}

impl From<RawBar> for MergedBar {
    fn from(b: RawBar) -> Self {
        MergedBar {
            dt: b.dt,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            vol: b.vol,
        }
    }
}

/// Top or bottom extremum mark shared by fractals, strokes and segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Top,
    Bottom,
}

impl Mark {
    /// The mark that must follow this one under strict alternation (I3/I6).
    pub fn opposite(self) -> Mark {
        match self {
            Mark::Top => Mark::Bottom,
            Mark::Bottom => Mark::Top,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Top => write!(f, "top"),
            Mark::Bottom => write!(f, "bottom"),
        }
    }
}
