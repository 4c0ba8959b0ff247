//! Series alignment onto the candle index.
//!
//! Indicator output is left-padded until it has exactly one value per candle,
//! and undefined values are converted to the zero sentinel consumed by the
//! backtest engine. Real values are never dropped.

use rust_decimal::Decimal;

use crate::domain::error::StochtraderError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Decimal>,
    /// Index of the first value that was defined before sentinel conversion.
    pub first_defined: Option<usize>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_defined_at(&self, index: usize) -> bool {
        self.first_defined.is_some_and(|first| index >= first)
    }
}

pub fn align(
    series: &IndicatorSeries,
    candle_count: usize,
) -> Result<AlignedSeries, StochtraderError> {
    if series.len() > candle_count {
        return Err(StochtraderError::SeriesLengthMismatch {
            series: series.indicator_type.to_string(),
            expected: candle_count,
            actual: series.len(),
        });
    }

    let padding = candle_count - series.len();
    let mut values = Vec::with_capacity(candle_count);
    values.resize(padding, Decimal::ZERO);
    values.extend(series.values.iter().map(|v| v.unwrap_or(Decimal::ZERO)));

    Ok(AlignedSeries {
        indicator_type: series.indicator_type,
        values,
        first_defined: series.first_defined().map(|i| i + padding),
    })
}
