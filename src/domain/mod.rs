//! Core domain types and logic.

pub mod candle;
pub mod trade;
pub mod indicator;
pub mod indicator_helpers;
pub mod alignment;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
