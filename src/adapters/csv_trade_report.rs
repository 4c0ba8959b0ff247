//! Trade ledger export as CSV.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StochtraderError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::ReportPort;
use std::path::PathBuf;

const HEADER: [&str; 7] = [
    "entry_time",
    "entry_price",
    "position_size",
    "exit_time",
    "exit_price",
    "exit_reason",
    "profit_loss",
];

pub struct CsvTradeReport {
    path: PathBuf,
}

impl CsvTradeReport {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn report_err(e: impl std::fmt::Display) -> StochtraderError {
    StochtraderError::Report {
        reason: e.to_string(),
    }
}

impl ReportPort for CsvTradeReport {
    fn write(&self, result: &BacktestResult, _metrics: &Metrics) -> Result<(), StochtraderError> {
        let mut wtr = csv::Writer::from_path(&self.path).map_err(report_err)?;
        wtr.write_record(HEADER).map_err(report_err)?;

        for trade in &result.trades {
            wtr.write_record([
                trade.entry_time.to_rfc3339(),
                trade.entry_price.to_string(),
                trade.position_size.to_string(),
                trade.exit_time.map(|t| t.to_rfc3339()).unwrap_or_default(),
                trade.exit_price.map(|p| p.to_string()).unwrap_or_default(),
                trade.exit_reason.map(|r| r.to_string()).unwrap_or_default(),
                trade.profit_loss().to_string(),
            ])
            .map_err(report_err)?;
        }

        wtr.flush()?;
        tracing::info!(
            path = %self.path.display(),
            trades = result.trades.len(),
            "wrote trade ledger"
        );
        Ok(())
    }
}
