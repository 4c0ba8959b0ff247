//! CSV file candle adapter.
//!
//! Expected columns: `open_time,open,high,low,close`; anything after `close`
//! (volume, close time, ...) is ignored. `open_time` is either Unix
//! milliseconds, as exchange kline dumps use, or an RFC 3339 timestamp.
//!
//! The header row is optional: a file whose first field already parses as an
//! `open_time` is read as headerless, which is how exchange dumps ship.

use crate::domain::candle::{validate_candles, Candle};
use crate::domain::error::StochtraderError;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
    file: Option<PathBuf>,
}

impl CsvAdapter {
    /// Reads `{symbol}_{interval}.csv` files below `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            file: None,
        }
    }

    /// Reads one explicit file regardless of symbol and interval.
    pub fn for_file(file: PathBuf) -> Self {
        Self {
            base_path: PathBuf::new(),
            file: Some(file),
        }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        match &self.file {
            Some(file) => file.clone(),
            None => self.base_path.join(format!("{}_{}.csv", symbol, interval)),
        }
    }
}

fn parse_open_time(value: &str) -> Result<DateTime<Utc>, StochtraderError> {
    if let Ok(millis) = value.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis).ok_or_else(|| StochtraderError::Data {
            reason: format!("open_time {} out of range", millis),
        });
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StochtraderError::Data {
            reason: format!("invalid open_time '{}': {}", value, e),
        })
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<Decimal, StochtraderError> {
    let raw = record.get(index).ok_or_else(|| StochtraderError::Data {
        reason: format!("missing {} column", column),
    })?;
    Decimal::from_str(raw).map_err(|e| StochtraderError::Data {
        reason: format!("invalid {} value '{}': {}", column, raw, e),
    })
}

/// True when the first line already holds a candle instead of column names.
fn starts_with_candle(content: &str) -> bool {
    content
        .lines()
        .next()
        .and_then(|line| line.split(',').next())
        .is_some_and(|field| parse_open_time(field.trim()).is_ok())
}

/// Parses a candle file, sorted oldest first and checked for strictly increasing times.
pub fn read_candles(path: &Path) -> Result<Vec<Candle>, StochtraderError> {
    let content = fs::read_to_string(path).map_err(|e| StochtraderError::Data {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(!starts_with_candle(&content))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut candles = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| StochtraderError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;

        let open_time_str = record.get(0).ok_or_else(|| StochtraderError::Data {
            reason: "missing open_time column".into(),
        })?;

        candles.push(Candle {
            open_time: parse_open_time(open_time_str)?,
            open: parse_price(&record, 1, "open")?,
            high: parse_price(&record, 2, "high")?,
            low: parse_price(&record, 3, "low")?,
            close: parse_price(&record, 4, "close")?,
        });
    }

    candles.sort_by_key(|c| c.open_time);
    validate_candles(&candles)?;
    Ok(candles)
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, StochtraderError> {
        let candles = read_candles(&self.csv_path(symbol, interval))?;
        if candles.is_empty() {
            return Err(StochtraderError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            });
        }
        Ok(candles)
    }
}
