#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cell::RefCell;
use std::collections::HashMap;
use stochtrader::domain::backtest::{BacktestConfig, BacktestResult};
use stochtrader::domain::candle::Candle;
use stochtrader::domain::error::StochtraderError;
use stochtrader::domain::indicator::WarmupPolicy;
use stochtrader::domain::metrics::Metrics;
use stochtrader::domain::strategy::Strategy;
use stochtrader::ports::data_port::DataPort;
use stochtrader::ports::report_port::ReportPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, StochtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StochtraderError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(candles) if !candles.is_empty() => Ok(candles.clone()),
            _ => Err(StochtraderError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            }),
        }
    }
}

/// Keeps the last result it was handed.
#[derive(Default)]
pub struct RecordingReport {
    pub result: RefCell<Option<BacktestResult>>,
    pub metrics: RefCell<Option<Metrics>>,
}

impl ReportPort for RecordingReport {
    fn write(&self, result: &BacktestResult, metrics: &Metrics) -> Result<(), StochtraderError> {
        *self.result.borrow_mut() = Some(result.clone());
        *self.metrics.borrow_mut() = Some(metrics.clone());
        Ok(())
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn make_candle(
    index: usize,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
) -> Candle {
    Candle {
        open_time: start_time() + Duration::hours(index as i64),
        open,
        high,
        low,
        close,
    }
}

/// Hourly candles around each close with a symmetric `spread`.
pub fn candles_from_closes(closes: &[Decimal], spread: Decimal) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_candle(i, close, close + spread, close - spread, close))
        .collect()
}

/// A saw-tooth market: long slides into oversold territory followed by sharp rallies.
pub fn swing_candles(count: usize) -> Vec<Candle> {
    let closes: Vec<Decimal> = (0..count)
        .map(|i| {
            let phase = (i % 30) as i64;
            let offset = if phase < 20 { -phase * 40 } else { -800 + (phase - 20) * 120 };
            dec!(20000) + Decimal::from(offset)
        })
        .collect();
    candles_from_closes(&closes, dec!(150))
}

pub fn default_config() -> BacktestConfig {
    BacktestConfig {
        initial_equity: dec!(1000),
        risk_percent: dec!(0.02),
    }
}

/// Enters on nearly every bar that is flat; useful for exercising the ledger.
pub fn eager_strategy(policy: WarmupPolicy) -> Strategy {
    Strategy {
        oversold: dec!(100.01),
        min_atr: Decimal::ZERO,
        warmup_policy: policy,
        ..Strategy::default()
    }
}
