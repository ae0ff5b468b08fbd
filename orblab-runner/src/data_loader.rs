//! Data loading — CSV bar files or deterministic synthetic sessions.
//!
//! Both paths end in a `LoadedData` carrying the bars, a BLAKE3 dataset
//! hash for run fingerprinting, and a synthetic flag.

use std::path::Path;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use orblab_core::domain::Bar;

use crate::config::BacktestConfig;

/// Errors from data loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    Timestamp { row: usize, value: String },
    #[error("no bars for {symbol} in the requested date range")]
    Empty { symbol: String },
}

/// Date filter applied after loading. Both bounds inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl LoadOptions {
    pub fn from_config(config: &BacktestConfig) -> Self {
        Self {
            start_date: config.backtest.start_date,
            end_date: config.backtest.end_date,
        }
    }

    fn keeps(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

/// Result of loading bar data.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub dataset_hash: String,
    /// True if the bars were generated rather than read from a file.
    pub has_synthetic: bool,
}

/// One CSV row before timestamp parsing.
#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load bars for `symbol` from a CSV file with header
/// `timestamp,open,high,low,close,volume`.
///
/// Rows are returned in file order; ordering and value checks happen when
/// the history is evaluated.
pub fn load_csv(symbol: &str, path: &Path, opts: &LoadOptions) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let bars = parse_bars_csv(file, opts)?;
    debug!(path = %path.display(), bars = bars.len(), "loaded CSV bars");
    finish(symbol, bars, false)
}

/// Parse CSV bar rows from any reader.
pub fn parse_bars_csv<R: std::io::Read>(reader: R, opts: &LoadOptions) -> Result<Vec<Bar>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (i, row) in rdr.deserialize::<CsvBar>().enumerate() {
        let row = row?;
        // Row 1 is the header.
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| LoadError::Timestamp {
            row: i + 2,
            value: row.timestamp.clone(),
        })?;
        if !opts.keeps(timestamp.date()) {
            continue;
        }
        bars.push(Bar::new(
            timestamp, row.open, row.high, row.low, row.close, row.volume,
        ));
    }
    Ok(bars)
}

/// Accepts `YYYY-MM-DD HH:MM[:SS]`, the same with a `T` separator, or
/// RFC 3339 (the offset is dropped and the local wall-clock time kept).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Generate `days` weekday sessions of synthetic minute bars starting at
/// `start`, for development without a data file.
///
/// Deterministic per symbol. The bars are clearly fake and tagged synthetic.
pub fn load_synthetic(
    symbol: &str,
    start: NaiveDate,
    days: usize,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    warn!(symbol, days, "using synthetic bars; results are not market data");
    let bars: Vec<Bar> = generate_synthetic_bars(symbol, start, days)
        .into_iter()
        .filter(|b| opts.keeps(b.date()))
        .collect();
    finish(symbol, bars, true)
}

fn finish(symbol: &str, bars: Vec<Bar>, has_synthetic: bool) -> Result<LoadedData, LoadError> {
    if bars.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }
    let dataset_hash = compute_dataset_hash(symbol, &bars);
    Ok(LoadedData {
        symbol: symbol.to_string(),
        bars,
        dataset_hash,
        has_synthetic,
    })
}

/// Compute a BLAKE3 hash of the bar data for reproducibility tracking.
pub fn compute_dataset_hash(symbol: &str, bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for bar in bars {
        hasher.update(bar.timestamp.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Minute bars per synthetic session: 09:30 through 16:00 inclusive.
const SESSION_MINUTES: i64 = 391;

/// Random-walk minute bars, 09:30–16:00 on weekdays only.
///
/// Each day gets an overnight gap and its own drift so that some sessions
/// trend out of the opening range and some chop inside it.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, days: usize) -> Vec<Bar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from symbol name
    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(days * SESSION_MINUTES as usize);
    let mut price = 100.0_f64;
    let mut date = start;
    let mut generated = 0;

    while generated < days {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date += Duration::days(1);
            continue;
        }

        let gap: f64 = rng.gen_range(-0.01..0.01);
        price *= 1.0 + gap;
        let drift: f64 = rng.gen_range(-0.0004..0.0004);
        let Some(open_time) = date.and_hms_opt(9, 30, 0) else {
            break;
        };

        for minute in 0..SESSION_MINUTES {
            let open = price;
            let close = (price * (1.0 + drift + rng.gen_range(-0.0012..0.0012))).max(1.0);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.0008));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.0008));
            // U-shaped intraday volume: heavy at the open and the close.
            let edge = (minute.min(SESSION_MINUTES - 1 - minute) as f64 / 30.0).min(1.0);
            let volume: f64 = rng.gen_range(20_000.0..60_000.0) * (3.0 - 2.0 * edge);

            bars.push(Bar::new(
                open_time + Duration::minutes(minute),
                open,
                high,
                low,
                close,
                volume.round(),
            ));
            price = close;
        }

        generated += 1;
        date += Duration::days(1);
    }

    bars
}
