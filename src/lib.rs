pub mod analyzer;
pub mod bar;
pub mod divergence;
pub mod error;
pub mod fractal;
pub mod frame;
pub mod indicators;
pub mod merge;
pub mod pivot;
pub mod segment;
pub mod stroke;
#[cfg(test)]
pub mod test_support;

pub use analyzer::{Analyzer, AnalyzerConfig};
pub use bar::{Mark, MergedBar, RawBar};
pub use divergence::{is_bei_chi, Direction, DivergenceMode, Leg};
pub use error::AnalyzerError;
pub use fractal::Fractal;
pub use frame::BarRow;
pub use pivot::{find_zs, Pivot, ZsPoint};
pub use segment::Segment;
pub use stroke::Stroke;
