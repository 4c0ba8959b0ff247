//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::console_report::ConsoleReport;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_report::CsvTradeReport;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::candle::{keep_most_recent, Candle};
use crate::domain::config_validation::{
    decimal_value, int_value, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::StochtraderError;
use crate::domain::indicator::{IndicatorType, WarmupPolicy};
use crate::domain::indicator_helpers::{compute_indicators, IndicatorSet};
use crate::domain::metrics::Metrics;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "stochtrader", about = "ATR + Stochastic RSI long-only backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Candle CSV to use instead of {data_dir}/{symbol}_{interval}.csv
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Write the trade ledger to this CSV file
        #[arg(long)]
        trades_out: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print candles with their aligned indicator values as CSV
    Indicators {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

/// Where candles come from and how many to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub symbol: String,
    pub interval: String,
    pub data_dir: PathBuf,
    pub max_candles: Option<usize>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            trades_out,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, data.as_deref(), trades_out)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Indicators { config, data } => run_indicators(&config, data.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StochtraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| StochtraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn load_validated(path: &Path) -> Result<FileConfigAdapter, StochtraderError> {
    tracing::info!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_backtest_config(&adapter)?;
    validate_strategy_config(&adapter)?;
    Ok(adapter)
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, StochtraderError> {
    Ok(BacktestConfig {
        initial_equity: decimal_value(adapter, "backtest", "initial_equity", Decimal::from(1000))?,
        risk_percent: decimal_value(adapter, "backtest", "risk_percent", Decimal::new(2, 2))?,
    })
}

pub fn build_strategy(adapter: &dyn ConfigPort) -> Result<Strategy, StochtraderError> {
    let defaults = Strategy::default();
    let period = |key: &str, default: usize| -> Result<usize, StochtraderError> {
        let value = int_value(adapter, "strategy", key, default as i64)?;
        usize::try_from(value).map_err(|_| StochtraderError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{} must be non-negative", key),
        })
    };

    let warmup_policy = match adapter.get_string("strategy", "warmup_policy") {
        Some(s) => WarmupPolicy::from_str(&s).map_err(|reason| StochtraderError::ConfigInvalid {
            section: "strategy".into(),
            key: "warmup_policy".into(),
            reason,
        })?,
        None => defaults.warmup_policy,
    };

    Ok(Strategy {
        atr_period: period("atr_period", defaults.atr_period)?,
        rsi_period: period("rsi_period", defaults.rsi_period)?,
        stoch_period: period("stoch_period", defaults.stoch_period)?,
        k_smooth: period("k_smooth", defaults.k_smooth)?,
        d_smooth: period("d_smooth", defaults.d_smooth)?,
        stop_loss_atr: decimal_value(adapter, "strategy", "stop_loss_atr", defaults.stop_loss_atr)?,
        take_profit_atr: decimal_value(
            adapter,
            "strategy",
            "take_profit_atr",
            defaults.take_profit_atr,
        )?,
        oversold: decimal_value(adapter, "strategy", "oversold", defaults.oversold)?,
        min_atr: decimal_value(adapter, "strategy", "min_atr", defaults.min_atr)?,
        warmup_policy,
    })
}

pub fn build_data_settings(adapter: &dyn ConfigPort) -> Result<DataSettings, StochtraderError> {
    let required = |key: &str| {
        adapter
            .get_string("backtest", key)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| StochtraderError::ConfigMissing {
                section: "backtest".into(),
                key: key.into(),
            })
    };

    let max_candles = match adapter.get_string("backtest", "max_candles") {
        Some(_) => Some(int_value(adapter, "backtest", "max_candles", 0)?.max(0) as usize),
        None => None,
    };

    Ok(DataSettings {
        symbol: required("symbol")?,
        interval: required("interval")?,
        data_dir: PathBuf::from(
            adapter
                .get_string("backtest", "data_dir")
                .unwrap_or_else(|| "data".to_string()),
        ),
        max_candles,
    })
}

fn data_port_for(settings: &DataSettings, data_override: Option<&Path>) -> CsvAdapter {
    match data_override {
        Some(file) => CsvAdapter::for_file(file.to_path_buf()),
        None => CsvAdapter::new(settings.data_dir.clone()),
    }
}

pub fn load_candles(
    data_port: &dyn DataPort,
    settings: &DataSettings,
) -> Result<Vec<Candle>, StochtraderError> {
    let candles = data_port.fetch_candles(&settings.symbol, &settings.interval)?;
    tracing::info!(
        "Loaded {} candles for {} ({})",
        candles.len(),
        settings.symbol,
        settings.interval
    );
    Ok(match settings.max_candles {
        Some(max) => keep_most_recent(candles, max),
        None => candles,
    })
}

/// Runs the backtest on fetched candles and passes the result to each report.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    settings: &DataSettings,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
    reports: &[&dyn ReportPort],
) -> Result<Metrics, StochtraderError> {
    let candles = load_candles(data_port, settings)?;
    let result = backtest_engine::run_strategy(&candles, strategy, bt_config)?;
    let metrics = Metrics::compute(&result);
    for report in reports {
        report.write(&result, &metrics)?;
    }
    Ok(metrics)
}

pub fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    trades_out: Option<PathBuf>,
) -> Result<(), StochtraderError> {
    let adapter = load_validated(config_path)?;
    let strategy = build_strategy(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let settings = build_data_settings(&adapter)?;

    let trades_path = trades_out.or_else(|| {
        adapter
            .get_string("report", "trades_csv")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
    });
    let console = ConsoleReport::new(adapter.get_bool("report", "show_trades", true));
    let csv_report = trades_path.map(CsvTradeReport::new);

    let mut reports: Vec<&dyn ReportPort> = vec![&console];
    if let Some(ref r) = csv_report {
        reports.push(r);
    }

    let data_port = data_port_for(&settings, data_override);
    run_backtest_pipeline(&data_port, &settings, &strategy, &bt_config, &reports)?;
    Ok(())
}

pub fn format_dry_run(
    settings: &DataSettings,
    strategy: &Strategy,
    bt_config: &BacktestConfig,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Symbol:          {}\n", settings.symbol));
    out.push_str(&format!("Interval:        {}\n", settings.interval));
    out.push_str(&format!("Data directory:  {}\n", settings.data_dir.display()));
    if let Some(max) = settings.max_candles {
        out.push_str(&format!("Max candles:     {}\n", max));
    }
    out.push_str(&format!("Initial equity:  {}\n", bt_config.initial_equity));
    out.push_str(&format!("Risk per trade:  {}\n", bt_config.risk_percent));
    out.push_str(&format!(
        "Indicators:      ATR({}), {}\n",
        strategy.atr_period,
        IndicatorType::StochRsiD {
            rsi_period: strategy.rsi_period,
            stoch_period: strategy.stoch_period,
            k_smooth: strategy.k_smooth,
            d_smooth: strategy.d_smooth,
        }
    ));
    out.push_str(&format!(
        "Entry:           %D < {} and ATR >= {}\n",
        strategy.oversold, strategy.min_atr
    ));
    out.push_str(&format!(
        "Exits:           stop {} x ATR, target {} x ATR\n",
        strategy.stop_loss_atr, strategy.take_profit_atr
    ));
    out.push_str(&format!("Warm-up policy:  {}\n", strategy.warmup_policy));
    out
}

pub fn run_dry_run(config_path: &Path) -> Result<(), StochtraderError> {
    let adapter = load_validated(config_path)?;
    let strategy = build_strategy(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let settings = build_data_settings(&adapter)?;
    tracing::info!("Config validated successfully");
    print!("{}", format_dry_run(&settings, &strategy, &bt_config));
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), StochtraderError> {
    let adapter = load_validated(config_path)?;
    build_strategy(&adapter)?;
    build_backtest_config(&adapter)?;
    build_data_settings(&adapter)?;
    println!("{}: OK", config_path.display());
    Ok(())
}

/// Writes `open_time,open,high,low,close` plus every aligned indicator column.
pub fn write_indicator_csv<W: Write>(
    writer: W,
    candles: &[Candle],
    indicators: &IndicatorSet,
) -> Result<(), StochtraderError> {
    let report_err = |e: csv::Error| StochtraderError::Report {
        reason: e.to_string(),
    };
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([
        "open_time",
        "open",
        "high",
        "low",
        "close",
        "atr",
        "rsi",
        "stoch_rsi",
        "stoch_k",
        "stoch_d",
    ])
    .map_err(report_err)?;

    for (i, c) in candles.iter().enumerate() {
        wtr.write_record([
            c.open_time.to_rfc3339(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            indicators.atr.values[i].to_string(),
            indicators.rsi.values[i].to_string(),
            indicators.stoch_raw.values[i].to_string(),
            indicators.stoch_k.values[i].to_string(),
            indicators.stoch_d.values[i].to_string(),
        ])
        .map_err(report_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_indicators(
    config_path: &Path,
    data_override: Option<&Path>,
) -> Result<(), StochtraderError> {
    let adapter = load_validated(config_path)?;
    let strategy = build_strategy(&adapter)?;
    let settings = build_data_settings(&adapter)?;

    let data_port = data_port_for(&settings, data_override);
    let candles = load_candles(&data_port, &settings)?;
    let indicators = compute_indicators(&candles, &strategy)?;
    write_indicator_csv(std::io::stdout().lock(), &candles, &indicators)
}
