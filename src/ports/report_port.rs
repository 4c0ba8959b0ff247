//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StochtraderError;
use crate::domain::metrics::Metrics;

/// Port for presenting a finished backtest.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, metrics: &Metrics) -> Result<(), StochtraderError>;
}
