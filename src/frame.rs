//! C1 (supplemented) — flattened per-bar projection, mirroring
//! `KlineAnalyze.to_df`'s column set (spec.md §4.8).

use crate::bar::Mark;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of [`crate::analyzer::Analyzer::to_frame`]'s output — a raw bar
/// annotated with whichever structural marks and indicator values line up
/// with its timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarRow {
    pub dt: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub vol: f64,

    pub fx_mark: Option<Mark>,
    pub fx: Option<f64>,
    pub bi: Option<f64>,
    pub xd: Option<f64>,

    pub ma: BTreeMap<usize, f64>,
    pub macd_hist: Option<f64>,
    pub boll_mid: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_lower: Option<f64>,
}
