//! Indicator pipeline: candles → raw series → aligned series.

use crate::domain::alignment::{align, AlignedSeries};
use crate::domain::candle::{closes, Candle};
use crate::domain::error::StochtraderError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::stoch_rsi::calculate_stoch_rsi;
use crate::domain::strategy::Strategy;

/// Every series the strategy reads, one value per candle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub atr: AlignedSeries,
    pub rsi: AlignedSeries,
    pub stoch_raw: AlignedSeries,
    pub stoch_k: AlignedSeries,
    /// The %D line; this is the StochRSI value the backtest trades on.
    pub stoch_d: AlignedSeries,
}

pub fn compute_indicators(
    candles: &[Candle],
    strategy: &Strategy,
) -> Result<IndicatorSet, StochtraderError> {
    let count = candles.len();
    let atr = calculate_atr(candles, strategy.atr_period);
    let stoch = calculate_stoch_rsi(
        &closes(candles),
        strategy.stoch_rsi_params(),
        strategy.warmup_policy,
    );

    Ok(IndicatorSet {
        atr: align(&atr, count)?,
        rsi: align(&stoch.rsi, count)?,
        stoch_raw: align(&stoch.raw, count)?,
        stoch_k: align(&stoch.k, count)?,
        stoch_d: align(&stoch.d, count)?,
    })
}
