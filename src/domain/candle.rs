//! OHLC candle representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::error::StochtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: Decimal) -> Decimal {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Checks that open times strictly increase across the sequence.
pub fn validate_candles(candles: &[Candle]) -> Result<(), StochtraderError> {
    for (i, pair) in candles.windows(2).enumerate() {
        if pair[1].open_time <= pair[0].open_time {
            return Err(StochtraderError::UnorderedCandles { index: i + 1 });
        }
    }
    Ok(())
}

pub fn closes(candles: &[Candle]) -> Vec<Decimal> {
    candles.iter().map(|c| c.close).collect()
}

/// Drops the oldest candles so at most `max` remain.
pub fn keep_most_recent(mut candles: Vec<Candle>, max: usize) -> Vec<Candle> {
    if candles.len() > max {
        candles.drain(..candles.len() - max);
    }
    candles
}
