//! Configuration validation.
//!
//! Validates all config fields before a backtest runs. Numeric keys that are
//! present but unparseable are rejected here rather than silently replaced by
//! their defaults.

use crate::domain::error::StochtraderError;
use crate::domain::indicator::WarmupPolicy;
use crate::ports::config_port::ConfigPort;
use rust_decimal::Decimal;
use std::str::FromStr;

const PERIOD_KEYS: [&str; 5] = [
    "atr_period",
    "rsi_period",
    "stoch_period",
    "k_smooth",
    "d_smooth",
];

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    validate_required(config, "backtest", "symbol")?;
    validate_required(config, "backtest", "interval")?;
    validate_initial_equity(config)?;
    validate_risk_percent(config)?;
    validate_max_candles(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    for key in PERIOD_KEYS {
        validate_period(config, key)?;
    }
    validate_multiplier(config, "stop_loss_atr")?;
    validate_multiplier(config, "take_profit_atr")?;
    validate_oversold(config)?;
    validate_min_atr(config)?;
    validate_warmup_policy(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StochtraderError {
    StochtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Decimal value of `key`, `default` when absent, an error when present but not a number.
pub fn decimal_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Decimal,
) -> Result<Decimal, StochtraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => Decimal::from_str(s.trim())
            .map_err(|_| invalid(section, key, format!("{} must be a number, got '{}'", key, s))),
    }
}

/// Integer value of `key`, `default` when absent, an error when present but not an integer.
pub fn int_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, StochtraderError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(section, key, format!("{} must be an integer, got '{}'", key, s))),
    }
}

fn validate_required(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), StochtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(StochtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_initial_equity(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    let value = decimal_value(config, "backtest", "initial_equity", Decimal::from(1000))?;
    if value <= Decimal::ZERO {
        return Err(invalid("backtest", "initial_equity", "initial_equity must be positive"));
    }
    Ok(())
}

fn validate_risk_percent(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    let value = decimal_value(config, "backtest", "risk_percent", Decimal::new(2, 2))?;
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(invalid(
            "backtest",
            "risk_percent",
            "risk_percent must be greater than 0 and at most 1",
        ));
    }
    Ok(())
}

fn validate_max_candles(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    if config.get_string("backtest", "max_candles").is_none() {
        return Ok(());
    }
    let value = int_value(config, "backtest", "max_candles", 0)?;
    if value < 2 {
        return Err(invalid("backtest", "max_candles", "max_candles must be at least 2"));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<(), StochtraderError> {
    let value = int_value(config, "strategy", key, 1)?;
    if value < 1 {
        return Err(invalid("strategy", key, format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_multiplier(config: &dyn ConfigPort, key: &str) -> Result<(), StochtraderError> {
    let value = decimal_value(config, "strategy", key, Decimal::ONE)?;
    if value <= Decimal::ZERO {
        return Err(invalid("strategy", key, format!("{} must be positive", key)));
    }
    Ok(())
}

fn validate_oversold(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    let value = decimal_value(config, "strategy", "oversold", Decimal::from(20))?;
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(invalid("strategy", "oversold", "oversold must be between 0 and 100"));
    }
    Ok(())
}

fn validate_min_atr(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    let value = decimal_value(config, "strategy", "min_atr", Decimal::from(100))?;
    if value < Decimal::ZERO {
        return Err(invalid("strategy", "min_atr", "min_atr must be non-negative"));
    }
    Ok(())
}

fn validate_warmup_policy(config: &dyn ConfigPort) -> Result<(), StochtraderError> {
    match config.get_string("strategy", "warmup_policy") {
        None => Ok(()),
        Some(s) => WarmupPolicy::from_str(&s)
            .map(|_| ())
            .map_err(|reason| invalid("strategy", "warmup_policy", reason)),
    }
}
