//! Performance metrics over the trade ledger.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::backtest::{BacktestResult, EquityPoint};
use super::trade::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    /// Percentage of trades with positive P/L (0..=100).
    pub win_rate: Decimal,
    pub net_profit: Decimal,
    pub gross_profit: Decimal,
    /// Sum of absolute losses.
    pub gross_loss: Decimal,
    /// gross_profit / gross_loss, or gross_profit when nothing was lost.
    pub profit_factor: Decimal,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    /// Percent change from initial to final equity.
    pub total_return: Decimal,
    /// Largest peak-to-trough decline of realized equity, in percent.
    pub max_drawdown: Decimal,
}

impl Metrics {
    pub fn compute(result: &BacktestResult) -> Self {
        let mut metrics = Self::from_trades(&result.trades);
        metrics.initial_equity = result.initial_equity;
        metrics.final_equity = result.final_equity;
        metrics.total_return = if result.initial_equity > Decimal::ZERO {
            (result.final_equity - result.initial_equity) / result.initial_equity * dec!(100)
        } else {
            Decimal::ZERO
        };
        metrics.max_drawdown = compute_drawdown(&result.equity_curve);
        metrics
    }

    /// Ledger-only statistics; equity fields are left at zero.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;
        let mut largest_win = Decimal::ZERO;
        let mut largest_loss = Decimal::ZERO;

        for trade in trades {
            let pl = trade.profit_loss();
            if pl > Decimal::ZERO {
                trades_won += 1;
                gross_profit += pl;
                largest_win = largest_win.max(pl);
            } else if pl < Decimal::ZERO {
                trades_lost += 1;
                gross_loss += pl.abs();
                largest_loss = largest_loss.max(pl.abs());
            } else {
                trades_breakeven += 1;
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            Decimal::from(trades_won as u64) / Decimal::from(total_trades as u64) * dec!(100)
        } else {
            Decimal::ZERO
        };

        let profit_factor = if gross_loss == Decimal::ZERO {
            gross_profit
        } else {
            gross_profit / gross_loss
        };

        let avg_win = if trades_won > 0 {
            gross_profit / Decimal::from(trades_won as u64)
        } else {
            Decimal::ZERO
        };

        let avg_loss = if trades_lost > 0 {
            gross_loss / Decimal::from(trades_lost as u64)
        } else {
            Decimal::ZERO
        };

        Metrics {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            net_profit: trades.iter().map(Trade::profit_loss).sum(),
            gross_profit,
            gross_loss,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            initial_equity: Decimal::ZERO,
            final_equity: Decimal::ZERO,
            total_return: Decimal::ZERO,
            max_drawdown: Decimal::ZERO,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> Decimal {
    let Some(first) = equity_curve.first() else {
        return Decimal::ZERO;
    };

    let mut peak = first.equity;
    let mut max_dd = Decimal::ZERO;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > Decimal::ZERO {
            let dd = (peak - point.equity) / peak * dec!(100);
            max_dd = max_dd.max(dd);
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::ExitReason;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn time(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(i)
    }

    fn make_trade(pl: Decimal) -> Trade {
        // size 1 so the exit distance equals the P/L
        Trade::open(time(0), dec!(100), dec!(1)).close(
            time(1),
            dec!(100) + pl,
            if pl < Decimal::ZERO {
                ExitReason::StopLoss
            } else {
                ExitReason::TakeProfit
            },
        )
    }

    fn make_equity_curve(values: &[Decimal]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                time: time(i as i64),
                equity,
            })
            .collect()
    }

    #[test]
    fn metrics_empty_ledger() {
        let metrics = Metrics::from_trades(&[]);
        assert_eq!(metrics.total_trades, 0);
        assert_eq!(metrics.win_rate, dec!(0));
        assert_eq!(metrics.net_profit, dec!(0));
        assert_eq!(metrics.profit_factor, dec!(0));
        assert_eq!(metrics.avg_win, dec!(0));
        assert_eq!(metrics.avg_loss, dec!(0));
    }

    #[test]
    fn metrics_trade_stats_wins_and_losses() {
        let trades = vec![
            make_trade(dec!(100)),
            make_trade(dec!(-50)),
            make_trade(dec!(200)),
            make_trade(dec!(0)),
        ];
        let metrics = Metrics::from_trades(&trades);

        assert_eq!(metrics.total_trades, 4);
        assert_eq!(metrics.trades_won, 2);
        assert_eq!(metrics.trades_lost, 1);
        assert_eq!(metrics.trades_breakeven, 1);
        assert_eq!(metrics.win_rate, dec!(50));
        assert_eq!(metrics.net_profit, dec!(250));
    }

    #[test]
    fn metrics_profit_factor() {
        let trades = vec![
            make_trade(dec!(100)),
            make_trade(dec!(-50)),
            make_trade(dec!(200)),
        ];
        let metrics = Metrics::from_trades(&trades);

        assert_eq!(metrics.gross_profit, dec!(300));
        assert_eq!(metrics.gross_loss, dec!(50));
        assert_eq!(metrics.profit_factor, dec!(6));
    }

    #[test]
    fn metrics_profit_factor_without_losses_is_gross_profit() {
        let trades = vec![make_trade(dec!(40)), make_trade(dec!(60))];
        let metrics = Metrics::from_trades(&trades);
        assert_eq!(metrics.profit_factor, dec!(100));
        assert_eq!(metrics.win_rate, dec!(100));
    }

    #[test]
    fn metrics_all_losses() {
        let trades = vec![make_trade(dec!(-10)), make_trade(dec!(-30))];
        let metrics = Metrics::from_trades(&trades);
        assert_eq!(metrics.profit_factor, dec!(0));
        assert_eq!(metrics.win_rate, dec!(0));
        assert_eq!(metrics.net_profit, dec!(-40));
    }

    #[test]
    fn metrics_avg_and_largest() {
        let trades = vec![
            make_trade(dec!(100)),
            make_trade(dec!(-60)),
            make_trade(dec!(300)),
            make_trade(dec!(-40)),
        ];
        let metrics = Metrics::from_trades(&trades);

        assert_eq!(metrics.avg_win, dec!(200));
        assert_eq!(metrics.avg_loss, dec!(50));
        assert_eq!(metrics.largest_win, dec!(300));
        assert_eq!(metrics.largest_loss, dec!(60));
    }

    #[test]
    fn metrics_open_trade_counts_as_breakeven() {
        let open = Trade::open(time(0), dec!(100), dec!(1));
        let metrics = Metrics::from_trades(&[open]);
        assert_eq!(metrics.trades_breakeven, 1);
        assert_eq!(metrics.net_profit, dec!(0));
    }

    #[test]
    fn metrics_max_drawdown() {
        let curve = make_equity_curve(&[
            dec!(100),
            dec!(110),
            dec!(90),
            dec!(95),
            dec!(88),
            dec!(120),
        ]);
        // (110 - 88) / 110 = 20%
        assert_eq!(compute_drawdown(&curve), dec!(20));
    }

    #[test]
    fn metrics_compute_uses_result_equity() {
        let trades = vec![make_trade(dec!(-100)), make_trade(dec!(300))];
        let result = BacktestResult {
            trades,
            initial_equity: dec!(1000),
            final_equity: dec!(1200),
            equity_curve: make_equity_curve(&[dec!(1000), dec!(900), dec!(1200)]),
        };
        let metrics = Metrics::compute(&result);

        assert_eq!(metrics.total_return, dec!(20));
        assert_eq!(metrics.max_drawdown, dec!(10));
        assert_eq!(metrics.final_equity, dec!(1200));
        assert_eq!(metrics.net_profit, dec!(200));
    }
}
