//! Domain error types.

/// Top-level error type for stochtrader.
#[derive(Debug, thiserror::Error)]
pub enum StochtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no candles for {symbol} ({interval})")]
    NoData { symbol: String, interval: String },

    #[error("insufficient candles: have {have}, need at least {need}")]
    InsufficientCandles { have: usize, need: usize },

    #[error("candles out of order at index {index}: open time does not increase")]
    UnorderedCandles { index: usize },

    #[error("indicator {series} has {actual} values, expected {expected} (one per candle)")]
    SeriesLengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StochtraderError> for std::process::ExitCode {
    fn from(err: &StochtraderError) -> Self {
        let code: u8 = match err {
            StochtraderError::Io(_) | StochtraderError::Report { .. } => 1,
            StochtraderError::ConfigParse { .. }
            | StochtraderError::ConfigMissing { .. }
            | StochtraderError::ConfigInvalid { .. } => 2,
            StochtraderError::Data { .. }
            | StochtraderError::NoData { .. }
            | StochtraderError::UnorderedCandles { .. } => 3,
            StochtraderError::InsufficientCandles { .. }
            | StochtraderError::SeriesLengthMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_message_names_series() {
        let err = StochtraderError::SeriesLengthMismatch {
            series: "ATR(10)".into(),
            expected: 50,
            actual: 49,
        };
        assert_eq!(
            err.to_string(),
            "indicator ATR(10) has 49 values, expected 50 (one per candle)"
        );
    }

    #[test]
    fn config_missing_message() {
        let err = StochtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] symbol");
    }
}
