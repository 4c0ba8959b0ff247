//! Average True Range with exponential smoothing.
//!
//! TR[t] = max(H-L, |H-prevC|, |L-prevC|) for every bar after the first.
//! α = 2/(n+1), seeded with the simple mean of the first n TR values, then
//! ATR[t] = (TR[t] - ATR[t-1]) * α + ATR[t-1].
//!
//! Warmup: the first bar (no TR) plus the first n TR samples are undefined, so
//! the first defined value sits at bar index n+1.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::candle::Candle;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub fn true_ranges(candles: &[Candle]) -> Vec<Decimal> {
    candles
        .windows(2)
        .map(|pair| pair[1].true_range(pair[0].close))
        .collect()
}

pub fn calculate_atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Atr(period);
    if period == 0 || candles.len() < 2 {
        return IndicatorSeries::undefined(indicator_type, candles.len());
    }

    let tr = true_ranges(candles);
    let alpha = dec!(2) / Decimal::from(period as u64 + 1);

    let mut values = Vec::with_capacity(candles.len());
    // Bar 0 has no previous close and therefore no true range.
    values.push(None);

    let mut prev_atr: Option<Decimal> = None;
    for (t, &range) in tr.iter().enumerate() {
        if t < period {
            values.push(None);
            continue;
        }

        let atr = match prev_atr {
            None => tr[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64),
            Some(prev) => (range - prev) * alpha + prev,
        };
        prev_atr = Some(atr);
        values.push(Some(atr));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}
