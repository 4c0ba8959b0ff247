//! Stochastic RSI with %K / %D smoothing.
//!
//! raw[i] = (RSI[i] - min(window)) / (max(window) - min(window)) * 100 over the
//! trailing `stoch_period` RSI values; a flat window yields 0.
//! %K = SMA(raw, k_smooth), %D = SMA(%K, d_smooth).
//!
//! Undefined values inside any window follow the supplied [`WarmupPolicy`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::{
    smooth, trailing_window, IndicatorSeries, IndicatorType, WarmupPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochRsiParams {
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub k_smooth: usize,
    pub d_smooth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StochRsi {
    pub rsi: IndicatorSeries,
    pub raw: IndicatorSeries,
    pub k: IndicatorSeries,
    pub d: IndicatorSeries,
}

pub fn stoch_of_rsi(
    rsi: &IndicatorSeries,
    stoch_period: usize,
    policy: WarmupPolicy,
) -> Vec<Option<Decimal>> {
    (0..rsi.len())
        .map(|i| {
            let window = trailing_window(&rsi.values, i, stoch_period, policy)?;
            let current = *window.last()?;
            let min = window.iter().copied().min()?;
            let max = window.iter().copied().max()?;
            let range = max - min;
            if range == Decimal::ZERO {
                Some(Decimal::ZERO)
            } else {
                Some((current - min) / range * dec!(100))
            }
        })
        .collect()
}

pub fn calculate_stoch_rsi(
    closes: &[Decimal],
    params: StochRsiParams,
    policy: WarmupPolicy,
) -> StochRsi {
    let StochRsiParams {
        rsi_period,
        stoch_period,
        k_smooth,
        d_smooth,
    } = params;

    let rsi = calculate_rsi(closes, rsi_period);
    let raw_values = stoch_of_rsi(&rsi, stoch_period, policy);
    let k_values = smooth(&raw_values, k_smooth, policy);
    let d_values = smooth(&k_values, d_smooth, policy);

    StochRsi {
        rsi,
        raw: IndicatorSeries {
            indicator_type: IndicatorType::StochRsiRaw {
                rsi_period,
                stoch_period,
            },
            values: raw_values,
        },
        k: IndicatorSeries {
            indicator_type: IndicatorType::StochRsiK {
                rsi_period,
                stoch_period,
                k_smooth,
            },
            values: k_values,
        },
        d: IndicatorSeries {
            indicator_type: IndicatorType::StochRsiD {
                rsi_period,
                stoch_period,
                k_smooth,
                d_smooth,
            },
            values: d_values,
        },
    }
}
