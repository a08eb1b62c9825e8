//! C6 — pivot (zhongshu / 中枢) finder.
//!
//! Pure function over a chronologically ordered list of stroke or segment
//! endpoints (spec.md §4.6). Consolidation zones are identified by sliding a
//! 5-point buffer and watching for an escape above/below it.

use crate::bar::Mark;
use crate::segment::Segment;
use crate::stroke::Stroke;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stroke or segment endpoint, as consumed by [`find_zs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZsPoint {
    pub dt: DateTime<Utc>,
    pub mark: Mark,
    pub price: f64,
}

impl From<Stroke> for ZsPoint {
    fn from(s: Stroke) -> Self {
        ZsPoint {
            dt: s.dt,
            mark: s.mark,
            price: s.price,
        }
    }
}

impl From<Segment> for ZsPoint {
    fn from(s: Segment) -> Self {
        ZsPoint {
            dt: s.dt,
            mark: s.mark,
            price: s.price,
        }
    }
}

/// A consolidation zone formed by four or more overlapping legs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pivot {
    /// max of the bottom prices among the first four member endpoints.
    pub zd: f64,
    /// min of the top prices among the first four member endpoints.
    pub zg: f64,
    /// max of the bottom prices over all members.
    pub d: f64,
    /// min of the bottom prices over all members.
    pub dd: f64,
    /// min of the top prices over all members.
    pub g: f64,
    /// max of the top prices over all members.
    pub gg: f64,
    pub points: Vec<ZsPoint>,
    pub third_buy: Option<ZsPoint>,
    pub third_sell: Option<ZsPoint>,
}

fn bottom_max(pts: &[ZsPoint]) -> f64 {
    pts.iter()
        .filter(|p| p.mark == Mark::Bottom)
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn bottom_min(pts: &[ZsPoint]) -> f64 {
    pts.iter()
        .filter(|p| p.mark == Mark::Bottom)
        .map(|p| p.price)
        .fold(f64::INFINITY, f64::min)
}

fn top_min(pts: &[ZsPoint]) -> f64 {
    pts.iter()
        .filter(|p| p.mark == Mark::Top)
        .map(|p| p.price)
        .fold(f64::INFINITY, f64::min)
}

fn top_max(pts: &[ZsPoint]) -> f64 {
    pts.iter()
        .filter(|p| p.mark == Mark::Top)
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn make_pivot(
    buf: &[ZsPoint],
    zd: f64,
    zg: f64,
    third_buy: Option<ZsPoint>,
    third_sell: Option<ZsPoint>,
) -> Pivot {
    Pivot {
        zd,
        zg,
        d: bottom_max(buf),
        dd: bottom_min(buf),
        g: top_min(buf),
        gg: top_max(buf),
        points: buf.to_vec(),
        third_buy,
        third_sell,
    }
}

/// Identify pivots from a chronologically ordered list of stroke or segment
/// endpoints. Pure function, no incremental state.
pub fn find_zs(points: &[ZsPoint]) -> Vec<Pivot> {
    if points.len() <= 4 {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut buf: Vec<ZsPoint> = Vec::new();

    let mut i = 0;
    while i < points.len() {
        if buf.len() < 5 {
            buf.push(points[i]);
            i += 1;
            continue;
        }

        let xp = points[i];
        let zd = bottom_max(&buf[..4]);
        let zg = top_min(&buf[..4]);

        if zg <= zd {
            buf.push(xp);
            buf.remove(0);
            i += 1;
            continue;
        }

        if xp.mark == Mark::Bottom && xp.price > zg {
            out.push(make_pivot(&buf, zd, zg, Some(xp), None));
            buf = vec![points[i - 1], xp];
        } else if xp.mark == Mark::Top && xp.price < zd {
            out.push(make_pivot(&buf, zd, zg, None, Some(xp)));
            buf = vec![points[i - 1], xp];
        } else {
            buf.push(xp);
        }
        i += 1;
    }

    if buf.len() >= 5 {
        let zd = bottom_max(&buf[..4]);
        let zg = top_min(&buf[..4]);
        out.push(make_pivot(&buf, zd, zg, None, None));
    }

    out
}
