//! C8 — the incremental analyzer facade, owning the full derived-sequence
//! pipeline (spec.md §4.1). Mirrors `original_source/czsc/analyze.py`'s
//! `KlineAnalyze` class, re-expressed as a typed Rust struct in the
//! teacher's plain-owned-`Vec` style (no DataFrame, no internal
//! cross-references between sequences).

use crate::bar::{MergedBar, RawBar};
use crate::error::AnalyzerError;
use crate::fractal::{self, Fractal};
use crate::frame::BarRow;
use crate::indicators::{boll, ma, macd};
use crate::merge;
use crate::segment::{self, Segment};
use crate::stroke::{self, Stroke};
use std::collections::BTreeMap;

/// Constructor configuration for an [`Analyzer`] — a plain argument struct,
/// not sourced from environment or disk (spec.md scopes out persistence and
/// I/O; see DESIGN.md for this deliberate divergence from the teacher's
/// `Config::from_env`).
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Minimum number of merged bars a stroke must span (笔内部的最少K线数量).
    pub min_bi_k: usize,
    /// Retention bound for the raw/merged series; derived series are
    /// retained at `max_raw_len / {2, 4, 8}` for fractals/strokes/segments.
    pub max_raw_len: usize,
    /// When true, promote internal `trace!` diagnostics to `debug!` so they
    /// surface under a default `RUST_LOG=debug` filter.
    pub verbose: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            min_bi_k: 5,
            max_raw_len: 10_000,
            verbose: false,
        }
    }
}

/// Incremental structural analyzer over one symbol's bar series.
///
/// Owns every derived sequence (C2–C6) and keeps them consistent as new
/// bars arrive via [`Analyzer::update`]. Every accessor returns an owned
/// copy, independent of subsequent updates (spec.md §3 aliasing rule).
#[derive(Debug, Clone)]
pub struct Analyzer {
    name: String,
    config: AnalyzerConfig,
    raw: Vec<RawBar>,
    merged: Vec<MergedBar>,
    fractals: Vec<Fractal>,
    strokes: Vec<Stroke>,
    segments: Vec<Segment>,
}

impl Analyzer {
    /// Build a new analyzer from an initial batch of raw bars, fully
    /// resolving all derived sequences in one pass (mirroring the source's
    /// `__init__`, which truncates `kline_raw` to `max_raw_len` first, then
    /// runs each `_update_*` stage a single time rather than replaying
    /// bar-by-bar).
    pub fn new(
        initial_bars: Vec<RawBar>,
        name: impl Into<String>,
        config: AnalyzerConfig,
    ) -> Result<Self, AnalyzerError> {
        let mut initial_bars = initial_bars;
        if initial_bars.len() > config.max_raw_len {
            let drop = initial_bars.len() - config.max_raw_len;
            initial_bars.drain(..drop);
        }

        for w in initial_bars.windows(2) {
            if w[1].dt < w[0].dt {
                return Err(AnalyzerError::OutOfOrderBar {
                    new_dt: w[1].dt,
                    last_dt: w[0].dt,
                });
            }
        }

        let mut analyzer = Analyzer {
            name: name.into(),
            config,
            raw: initial_bars,
            merged: Vec::new(),
            fractals: Vec::new(),
            strokes: Vec::new(),
            segments: Vec::new(),
        };
        analyzer.recompute_all()?;
        Ok(analyzer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> &[RawBar] {
        &self.raw
    }

    pub fn merged(&self) -> &[MergedBar] {
        &self.merged
    }

    pub fn fractals(&self) -> &[Fractal] {
        &self.fractals
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Feed one new bar, replacing the in-progress last bar in place when
    /// `bar` shares its `open` with the current last raw bar (the exchange
    /// is still streaming the same, not-yet-closed period), otherwise
    /// appending it as a newly closed bar.
    pub fn update(&mut self, bar: RawBar) -> Result<(), AnalyzerError> {
        if let Some(last) = self.raw.last() {
            if bar.dt < last.dt {
                return Err(AnalyzerError::OutOfOrderBar {
                    new_dt: bar.dt,
                    last_dt: last.dt,
                });
            }
            if bar.open == last.open {
                self.log("in-progress bar update: replacing tail");
                *self.raw.last_mut().unwrap() = bar;
            } else {
                self.raw.push(bar);
            }
        } else {
            self.raw.push(bar);
        }

        self.recompute_all()?;
        self.trim_to_retention();
        Ok(())
    }

    /// Re-derive every stage (C2 -> C5) from the current `raw` tail. Each
    /// stage function already implements its own retrograde window, so a
    /// single pass here is correct whether `raw` grew by one bar or was set
    /// wholesale by [`Analyzer::new`].
    fn recompute_all(&mut self) -> Result<(), AnalyzerError> {
        merge::update_merged(&mut self.merged, &self.raw);
        fractal::update_fractals(&mut self.fractals, &self.merged);
        stroke::update_strokes(
            &mut self.strokes,
            &self.fractals,
            &self.merged,
            self.config.min_bi_k,
        );
        segment::update_segments(&mut self.segments, &self.strokes, &self.merged)
    }

    fn trim_to_retention(&mut self) {
        let max_raw_len = self.config.max_raw_len;
        if self.raw.len() <= max_raw_len {
            return;
        }

        let drop_raw = self.raw.len() - max_raw_len;
        self.raw.drain(..drop_raw);

        truncate_front(&mut self.merged, max_raw_len);
        truncate_front(&mut self.fractals, max_raw_len / 2);
        truncate_front(&mut self.strokes, max_raw_len / 4);
        truncate_front(&mut self.segments, max_raw_len / 8);
    }

    fn log(&self, msg: &str) {
        if self.config.verbose {
            tracing::debug!(analyzer = %self.name, "{}", msg);
        } else {
            tracing::trace!(analyzer = %self.name, "{}", msg);
        }
    }

    /// Project the last `max_count` raw bars into annotated [`BarRow`]s,
    /// mirroring `KlineAnalyze.to_df` (spec.md §4.8).
    pub fn to_frame(
        &self,
        ma_params: &[usize],
        use_macd: bool,
        use_boll: bool,
        max_count: usize,
    ) -> Vec<BarRow> {
        let start = self.raw.len().saturating_sub(max_count);
        let bars = &self.raw[start..];
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let ma_cols = ma(&closes, ma_params);
        let macd_series = if use_macd {
            Some(macd(&closes, 12, 26, 9))
        } else {
            None
        };
        let boll_series = if use_boll {
            Some(boll(&closes, 20, 2.0))
        } else {
            None
        };

        let fx_window = self.fractals.len().saturating_sub(max_count / 2);
        let bi_window = self.strokes.len().saturating_sub(max_count / 4);
        let xd_window = self.segments.len().saturating_sub(max_count / 8);

        let fx_by_dt: BTreeMap<_, _> = self.fractals[fx_window..]
            .iter()
            .map(|f| (f.dt, (f.mark, f.price)))
            .collect();
        let bi_by_dt: BTreeMap<_, _> = self.strokes[bi_window..]
            .iter()
            .map(|s| (s.dt, (s.mark, s.price)))
            .collect();
        let xd_by_dt: BTreeMap<_, _> = self.segments[xd_window..]
            .iter()
            .map(|s| (s.dt, (s.mark, s.price)))
            .collect();

        bars.iter()
            .enumerate()
            .map(|(i, b)| {
                let (fx_mark, fx) = match fx_by_dt.get(&b.dt) {
                    Some(&(mark, price)) => (Some(mark), Some(price)),
                    None => (None, None),
                };
                let bi = bi_by_dt.get(&b.dt).map(|&(_, price)| price);
                let xd = xd_by_dt.get(&b.dt).map(|&(_, price)| price);

                let row_ma: BTreeMap<usize, f64> = ma_cols
                    .iter()
                    .map(|(&period, col)| (period, col[i]))
                    .collect();
                let macd_hist = macd_series.as_ref().map(|s| s.histogram[i]);
                let (boll_mid, boll_upper, boll_lower) = match &boll_series {
                    Some(s) => (Some(s.mid[i]), Some(s.upper[i]), Some(s.lower[i])),
                    None => (None, None, None),
                };

                BarRow {
                    dt: b.dt,
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                    vol: b.vol,
                    fx_mark,
                    fx,
                    bi,
                    xd,
                    ma: row_ma,
                    macd_hist,
                    boll_mid,
                    boll_upper,
                    boll_lower,
                }
            })
            .collect()
    }
}

fn truncate_front<T>(v: &mut Vec<T>, max_len: usize) {
    if v.len() > max_len {
        let drop = v.len() - max_len;
        v.drain(..drop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::raw_bars;

    #[test]
    fn rejects_out_of_order_bars() {
        let bars = raw_bars(&[(11.0, 10.0), (12.0, 11.0), (13.0, 12.0), (14.0, 13.0)]);
        let mut analyzer =
            Analyzer::new(bars.clone(), "TEST", AnalyzerConfig::default()).unwrap();
        let mut stale = bars[0].clone();
        stale.dt = bars[0].dt - chrono::Duration::minutes(10);
        let err = analyzer.update(stale).unwrap_err();
        assert!(matches!(err, AnalyzerError::OutOfOrderBar { .. }));
    }

    #[test]
    fn in_progress_bar_with_same_open_replaces_tail() {
        let mut bars = raw_bars(&[(11.0, 10.0), (12.0, 11.0), (13.0, 12.0), (14.0, 13.0)]);
        let mut analyzer =
            Analyzer::new(bars.clone(), "TEST", AnalyzerConfig::default()).unwrap();
        let raw_len_before = analyzer.raw().len();

        let mut revised = bars.pop().unwrap();
        revised.high = 20.0;
        revised.close = 20.0;
        analyzer.update(revised.clone()).unwrap();

        assert_eq!(analyzer.raw().len(), raw_len_before);
        assert_eq!(analyzer.raw().last().unwrap().high, 20.0);
    }

    #[test]
    fn retention_trims_all_derived_sequences() {
        let data: Vec<(f64, f64)> = (0..50)
            .map(|i| {
                let base = 10.0 + (i % 7) as f64;
                (base + 2.0, base)
            })
            .collect();
        let bars = raw_bars(&data);
        let config = AnalyzerConfig {
            min_bi_k: 1,
            max_raw_len: 20,
            verbose: false,
        };
        let analyzer = Analyzer::new(bars, "TEST", config).unwrap();
        assert!(analyzer.raw().len() <= 20);
        assert!(analyzer.merged().len() <= 20);
        assert!(analyzer.fractals().len() <= 10);
        assert!(analyzer.strokes().len() <= 5);
        assert!(analyzer.segments().len() <= 2);
    }

    #[test]
    fn to_frame_annotates_fractal_rows() {
        let bars = raw_bars(&[
            (10.0, 9.0),
            (11.0, 10.0),
            (12.0, 11.0),
            (11.0, 10.0),
            (10.0, 9.0),
        ]);
        let analyzer = Analyzer::new(bars, "TEST", AnalyzerConfig::default()).unwrap();
        let rows = analyzer.to_frame(&[2], false, false, 1000);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().any(|r| r.fx_mark.is_some()));
    }
}
