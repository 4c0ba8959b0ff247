//! Trade records for the single long position.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "stop_loss"),
            ExitReason::TakeProfit => write!(f, "take_profit"),
            ExitReason::EndOfData => write!(f, "end_of_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub entry_price: Decimal,
    pub position_size: Decimal,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_price: Option<Decimal>,
    pub exit_reason: Option<ExitReason>,
}

impl Trade {
    pub fn open(entry_time: DateTime<Utc>, entry_price: Decimal, position_size: Decimal) -> Self {
        Trade {
            entry_time,
            entry_price,
            position_size,
            exit_time: None,
            exit_price: None,
            exit_reason: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_price.is_none()
    }

    /// Realized P/L; zero while the trade is open.
    pub fn profit_loss(&self) -> Decimal {
        match self.exit_price {
            Some(exit) => (exit - self.entry_price) * self.position_size,
            None => Decimal::ZERO,
        }
    }

    pub fn close(
        mut self,
        exit_time: DateTime<Utc>,
        exit_price: Decimal,
        reason: ExitReason,
    ) -> Self {
        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.exit_reason = Some(reason);
        self
    }
}
