//! Plain-text report on stdout.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::StochtraderError;
use crate::domain::metrics::Metrics;
use crate::domain::trade::Trade;
use crate::ports::report_port::ReportPort;
use std::io::Write;

pub struct ConsoleReport {
    show_trades: bool,
}

impl ConsoleReport {
    pub fn new(show_trades: bool) -> Self {
        Self { show_trades }
    }

    pub fn render(&self, result: &BacktestResult, metrics: &Metrics) -> String {
        let mut out = String::new();
        if self.show_trades {
            out.push_str(&format_trade_log(&result.trades));
            out.push('\n');
        }
        out.push_str(&format_summary(metrics));
        out
    }
}

fn format_trade_line(index: usize, trade: &Trade) -> String {
    let exit_time = trade
        .exit_time
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let exit_price = trade
        .exit_price
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string());
    let reason = trade
        .exit_reason
        .map(|r| r.to_string())
        .unwrap_or_else(|| "open".to_string());

    format!(
        "{:>4}  {}  {:>12.2}  {}  {:>12}  {:>12.6}  {:>12.2}  {}\n",
        index + 1,
        trade.entry_time.format("%Y-%m-%d %H:%M"),
        trade.entry_price,
        exit_time,
        exit_price,
        trade.position_size,
        trade.profit_loss(),
        reason
    )
}

pub fn format_trade_log(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades executed.\n".to_string();
    }

    let mut out = String::from("Trades\n");
    for (i, trade) in trades.iter().enumerate() {
        out.push_str(&format_trade_line(i, trade));
    }
    out
}

pub fn format_summary(metrics: &Metrics) -> String {
    let mut out = String::from("Summary\n");
    let rows = [
        ("Total trades", metrics.total_trades.to_string()),
        (
            "Won / lost / even",
            format!(
                "{} / {} / {}",
                metrics.trades_won, metrics.trades_lost, metrics.trades_breakeven
            ),
        ),
        ("Win rate", format!("{:.2}%", metrics.win_rate)),
        ("Net profit", format!("{:.2}", metrics.net_profit)),
        ("Gross profit", format!("{:.2}", metrics.gross_profit)),
        ("Gross loss", format!("{:.2}", metrics.gross_loss)),
        ("Profit factor", format!("{:.2}", metrics.profit_factor)),
        ("Average win", format!("{:.2}", metrics.avg_win)),
        ("Average loss", format!("{:.2}", metrics.avg_loss)),
        ("Largest win", format!("{:.2}", metrics.largest_win)),
        ("Largest loss", format!("{:.2}", metrics.largest_loss)),
        ("Initial equity", format!("{:.2}", metrics.initial_equity)),
        ("Final equity", format!("{:.2}", metrics.final_equity)),
        ("Total return", format!("{:.2}%", metrics.total_return)),
        ("Max drawdown", format!("{:.2}%", metrics.max_drawdown)),
    ];
    for (label, value) in rows {
        out.push_str(&format!("  {:<18} {}\n", label, value));
    }
    out
}

impl ReportPort for ConsoleReport {
    fn write(&self, result: &BacktestResult, metrics: &Metrics) -> Result<(), StochtraderError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(self.render(result, metrics).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::ExitReason;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample_result() -> BacktestResult {
        let entry = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let exit = Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap();
        let trade =
            Trade::open(entry, dec!(100), dec!(2)).close(exit, dec!(110), ExitReason::TakeProfit);
        BacktestResult {
            trades: vec![trade],
            initial_equity: dec!(1000),
            final_equity: dec!(1020),
            equity_curve: Vec::new(),
        }
    }

    #[test]
    fn empty_trade_log() {
        assert_eq!(format_trade_log(&[]), "No trades executed.\n");
    }

    #[test]
    fn trade_log_has_one_line_per_trade() {
        let result = sample_result();
        let log = format_trade_log(&result.trades);
        assert_eq!(log.lines().count(), 2);
        assert!(log.contains("2024-01-01 00:00"));
        assert!(log.contains("110.00"));
        assert!(log.contains("20.00"));
        assert!(log.contains("take_profit"));
    }

    #[test]
    fn summary_lists_key_figures() {
        let result = sample_result();
        let metrics = Metrics::compute(&result);
        let summary = format_summary(&metrics);
        assert!(summary.contains("Total trades"));
        assert!(summary.contains("100.00%"));
        assert!(summary.contains("1020.00"));
        assert!(summary.contains("2.00%"));
    }

    #[test]
    fn render_without_trades_section() {
        let result = sample_result();
        let metrics = Metrics::compute(&result);
        let text = ConsoleReport::new(false).render(&result, &metrics);
        assert!(!text.contains("Trades\n"));
        assert!(text.starts_with("Summary"));
    }
}
