use anyhow::Result;
use chan_analyzer::{Analyzer, AnalyzerConfig, RawBar};
use chrono::{DateTime, Duration, Utc};
use tracing_subscriber::{fmt, EnvFilter};

fn synthetic_bars(symbol: &str, n: usize) -> Vec<RawBar> {
    let base: DateTime<Utc> = DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);

    (0..n)
        .map(|i| {
            let phase = (i as f64 / 7.0).sin() * 8.0 + (i as f64 / 23.0).cos() * 3.0;
            let low = 100.0 + phase;
            let high = low + 2.0;
            RawBar {
                symbol: symbol.to_string(),
                dt: base + Duration::minutes(i as i64),
                open: low,
                high,
                low,
                close: high,
                vol: 1_000.0,
            }
        })
        .collect()
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let bars = synthetic_bars("DEMO-USD", 200);
    let config = AnalyzerConfig {
        min_bi_k: 5,
        max_raw_len: 10_000,
        verbose: true,
    };
    let analyzer = Analyzer::new(bars, "demo", config)?;

    println!(
        "symbol={} raw={} merged={} fractals={} strokes={} segments={}",
        analyzer.name(),
        analyzer.raw().len(),
        analyzer.merged().len(),
        analyzer.fractals().len(),
        analyzer.strokes().len(),
        analyzer.segments().len(),
    );

    let rows = analyzer.to_frame(&[5, 20], true, true, 1_000);
    if let Some(last) = rows.last() {
        println!("last row: {}", serde_json::to_string(last)?);
    }

    Ok(())
}
