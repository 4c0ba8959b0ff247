//! Backtest engine and event loop.
//!
//! The engine is a two-state machine (`Flat` / `InTrade`) driven bar by bar.
//! All mutable run state lives in [`EngineState`], which [`step`] consumes and
//! returns, so a single bar can be exercised in isolation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::alignment::AlignedSeries;
use crate::domain::candle::{validate_candles, Candle};
use crate::domain::error::StochtraderError;
use crate::domain::indicator::WarmupPolicy;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::strategy::Strategy;
use crate::domain::trade::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_equity: Decimal,
    /// Fraction of current equity risked per trade (0.02 = 2%).
    pub risk_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    InTrade(Trade),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub equity: Decimal,
    pub position: PositionState,
}

impl EngineState {
    pub fn new(initial_equity: Decimal) -> Self {
        EngineState {
            equity: initial_equity,
            position: PositionState::Flat,
        }
    }

    pub fn open_trade(&self) -> Option<&Trade> {
        match &self.position {
            PositionState::InTrade(trade) => Some(trade),
            PositionState::Flat => None,
        }
    }
}

/// Inputs for one bar of the simulation.
#[derive(Debug, Clone)]
pub struct Bar<'a> {
    pub candle: &'a Candle,
    pub atr: Decimal,
    pub stoch_rsi: Decimal,
    /// False while the signal line is still warming up under the strict policy.
    pub signal_ready: bool,
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BarEvent {
    /// ATR sentinel: no trading logic ran.
    Skipped,
    Idle,
    Opened,
    Held,
    Closed(Trade),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub time: DateTime<Utc>,
    pub equity: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    /// Realized equity: the starting balance, then one point per closed trade.
    pub equity_curve: Vec<EquityPoint>,
}

fn exit_for(trade: &Trade, bar: &Bar<'_>, strategy: &Strategy) -> Option<(Decimal, ExitReason)> {
    let stop_loss = strategy.stop_loss(trade.entry_price, bar.atr);
    let take_profit = strategy.take_profit(trade.entry_price, bar.atr);

    if bar.candle.low <= stop_loss {
        Some((stop_loss, ExitReason::StopLoss))
    } else if bar.candle.high >= take_profit {
        Some((take_profit, ExitReason::TakeProfit))
    } else {
        None
    }
}

/// Advances the state machine by one bar.
pub fn step(
    state: EngineState,
    bar: &Bar<'_>,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> (EngineState, BarEvent) {
    if bar.atr == Decimal::ZERO {
        return (state, BarEvent::Skipped);
    }

    let EngineState { equity, position } = state;

    match position {
        PositionState::InTrade(trade) => match exit_for(&trade, bar, strategy) {
            Some((exit_price, reason)) => {
                let closed = trade.close(bar.candle.open_time, exit_price, reason);
                let equity = equity + closed.profit_loss();
                tracing::debug!(
                    "closed at {} ({}): price {}, P/L {}",
                    bar.candle.open_time,
                    reason,
                    exit_price,
                    closed.profit_loss()
                );
                (
                    EngineState {
                        equity,
                        position: PositionState::Flat,
                    },
                    BarEvent::Closed(closed),
                )
            }
            None => (
                EngineState {
                    equity,
                    position: PositionState::InTrade(trade),
                },
                BarEvent::Held,
            ),
        },
        PositionState::Flat => {
            let flat = EngineState {
                equity,
                position: PositionState::Flat,
            };
            let wants_entry = bar.signal_ready
                && bar.atr >= strategy.min_atr
                && bar.stoch_rsi < strategy.oversold;
            if !wants_entry || bar.is_last {
                return (flat, BarEvent::Idle);
            }

            let Some(position_size) =
                strategy.position_size(equity, config.risk_percent, bar.atr)
            else {
                tracing::warn!(
                    "entry signal at {} ignored: position size overflows for ATR {}",
                    bar.candle.open_time,
                    bar.atr
                );
                return (flat, BarEvent::Idle);
            };
            if position_size <= Decimal::ZERO {
                tracing::warn!(
                    "entry signal at {} ignored: equity {} leaves no position to size",
                    bar.candle.open_time,
                    equity
                );
                return (flat, BarEvent::Idle);
            }

            tracing::debug!(
                "opened at {}: price {}, size {}, ATR {}, StochRSI {}",
                bar.candle.open_time,
                bar.candle.close,
                position_size,
                bar.atr,
                bar.stoch_rsi
            );
            let trade = Trade::open(bar.candle.open_time, bar.candle.close, position_size);
            (
                EngineState {
                    equity,
                    position: PositionState::InTrade(trade),
                },
                BarEvent::Opened,
            )
        }
    }
}

fn check_length(series: &AlignedSeries, expected: usize) -> Result<(), StochtraderError> {
    if series.len() != expected {
        return Err(StochtraderError::SeriesLengthMismatch {
            series: series.indicator_type.to_string(),
            expected,
            actual: series.len(),
        });
    }
    Ok(())
}

/// Walks the candles with their aligned ATR and StochRSI (%D) series.
pub fn run_backtest(
    candles: &[Candle],
    atr: &AlignedSeries,
    stoch_rsi: &AlignedSeries,
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, StochtraderError> {
    if candles.len() < 2 {
        return Err(StochtraderError::InsufficientCandles {
            have: candles.len(),
            need: 2,
        });
    }
    check_length(atr, candles.len())?;
    check_length(stoch_rsi, candles.len())?;
    validate_candles(candles)?;

    if candles.len() < strategy.minimum_candles() {
        tracing::warn!(
            "{} candles is fewer than the {} needed to leave warm-up; no trades expected",
            candles.len(),
            strategy.minimum_candles()
        );
    }

    tracing::info!(
        "Starting backtest: {} bars, equity {}, risk {}",
        candles.len(),
        config.initial_equity,
        config.risk_percent
    );

    let last = candles.len() - 1;
    let mut state = EngineState::new(config.initial_equity);
    let mut trades = Vec::new();
    let mut equity_curve = vec![EquityPoint {
        time: candles[0].open_time,
        equity: config.initial_equity,
    }];

    for (i, candle) in candles.iter().enumerate().skip(1) {
        let signal_ready = match strategy.warmup_policy {
            WarmupPolicy::Reference => true,
            WarmupPolicy::Strict => stoch_rsi.is_defined_at(i),
        };
        let bar = Bar {
            candle,
            atr: atr.values[i],
            stoch_rsi: stoch_rsi.values[i],
            signal_ready,
            is_last: i == last,
        };

        let (next, event) = step(state, &bar, strategy, config);
        state = next;
        if let BarEvent::Closed(trade) = event {
            equity_curve.push(EquityPoint {
                time: candle.open_time,
                equity: state.equity,
            });
            trades.push(trade);
        }
    }

    if let PositionState::InTrade(trade) = state.position {
        let final_candle = &candles[last];
        let closed = trade.close(final_candle.open_time, final_candle.close, ExitReason::EndOfData);
        state.equity += closed.profit_loss();
        tracing::debug!(
            "closed open trade at end of data: price {}, P/L {}",
            final_candle.close,
            closed.profit_loss()
        );
        equity_curve.push(EquityPoint {
            time: final_candle.open_time,
            equity: state.equity,
        });
        trades.push(closed);
        state.position = PositionState::Flat;
    }

    tracing::info!(
        "Backtest complete: {} trades, final equity {}",
        trades.len(),
        state.equity
    );

    Ok(BacktestResult {
        trades,
        initial_equity: config.initial_equity,
        final_equity: state.equity,
        equity_curve,
    })
}

/// Computes indicators for `candles` and runs the backtest on them.
pub fn run_strategy(
    candles: &[Candle],
    strategy: &Strategy,
    config: &BacktestConfig,
) -> Result<BacktestResult, StochtraderError> {
    if candles.len() < 2 {
        return Err(StochtraderError::InsufficientCandles {
            have: candles.len(),
            need: 2,
        });
    }
    let indicators = compute_indicators(candles, strategy)?;
    run_backtest(candles, &indicators.atr, &indicators.stoch_d, strategy, config)
}
