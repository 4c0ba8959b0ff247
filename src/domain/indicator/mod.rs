//! Technical indicator implementations.
//!
//! This module provides types for representing indicator series:
//! - `IndicatorType`: indicator identity + parameters (used to label series)
//! - `IndicatorSeries`: one optional value per input bar, `None` during warm-up
//! - `WarmupPolicy`: how undefined values inside a rolling window are treated
//!
//! Every calculation is a pure function of its input slice.

pub mod atr;
pub mod rsi;
pub mod stoch_rsi;

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Atr(usize),
    Rsi(usize),
    StochRsiRaw {
        rsi_period: usize,
        stoch_period: usize,
    },
    StochRsiK {
        rsi_period: usize,
        stoch_period: usize,
        k_smooth: usize,
    },
    StochRsiD {
        rsi_period: usize,
        stoch_period: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::StochRsiRaw {
                rsi_period,
                stoch_period,
            } => write!(f, "STOCHRSI({},{})", rsi_period, stoch_period),
            IndicatorType::StochRsiK {
                rsi_period,
                stoch_period,
                k_smooth,
            } => write!(f, "STOCHRSI_K({},{},{})", rsi_period, stoch_period, k_smooth),
            IndicatorType::StochRsiD {
                rsi_period,
                stoch_period,
                k_smooth,
                d_smooth,
            } => write!(
                f,
                "STOCHRSI_D({},{},{},{})",
                rsi_period, stoch_period, k_smooth, d_smooth
            ),
        }
    }
}

/// Treatment of not-yet-defined values that fall inside a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarmupPolicy {
    /// Undefined values count as real zeros; reproduces the zero-padded
    /// reference output bit for bit.
    #[default]
    Reference,
    /// Any undefined value in a window makes the result undefined, and the
    /// backtest refuses entries until the signal line is defined.
    Strict,
}

impl FromStr for WarmupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reference" => Ok(WarmupPolicy::Reference),
            "strict" => Ok(WarmupPolicy::Strict),
            other => Err(format!(
                "unknown warmup policy '{}' (expected reference or strict)",
                other
            )),
        }
    }
}

impl fmt::Display for WarmupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupPolicy::Reference => write!(f, "reference"),
            WarmupPolicy::Strict => write!(f, "strict"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<Decimal>>,
}

impl IndicatorSeries {
    pub fn undefined(indicator_type: IndicatorType, len: usize) -> Self {
        Self {
            indicator_type,
            values: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first defined value, if the series ever warms up.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }
}

/// The `len` values ending at `end` (inclusive), or `None` when the window is
/// not yet full or, under [`WarmupPolicy::Strict`], contains an undefined value.
pub(crate) fn trailing_window(
    values: &[Option<Decimal>],
    end: usize,
    len: usize,
    policy: WarmupPolicy,
) -> Option<Vec<Decimal>> {
    if len == 0 || end >= values.len() || end + 1 < len {
        return None;
    }

    values[end + 1 - len..=end]
        .iter()
        .map(|v| match (v, policy) {
            (Some(x), _) => Some(*x),
            (None, WarmupPolicy::Reference) => Some(Decimal::ZERO),
            (None, WarmupPolicy::Strict) => None,
        })
        .collect()
}

/// Simple moving average over a trailing window of `period` values.
pub(crate) fn smooth(
    values: &[Option<Decimal>],
    period: usize,
    policy: WarmupPolicy,
) -> Vec<Option<Decimal>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let divisor = Decimal::from(period as u64);
    (0..values.len())
        .map(|i| {
            trailing_window(values, i, period, policy)
                .map(|window| window.iter().copied().sum::<Decimal>() / divisor)
        })
        .collect()
}
