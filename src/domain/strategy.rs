//! Strategy parameters: indicator periods, exit multipliers and entry filters.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::indicator::stoch_rsi::StochRsiParams;
use crate::domain::indicator::WarmupPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub atr_period: usize,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub k_smooth: usize,
    pub d_smooth: usize,
    /// Stop distance below entry, in ATR units.
    pub stop_loss_atr: Decimal,
    /// Target distance above entry, in ATR units.
    pub take_profit_atr: Decimal,
    /// Enter when %D is strictly below this level.
    pub oversold: Decimal,
    /// Minimum absolute ATR required to enter.
    pub min_atr: Decimal,
    pub warmup_policy: WarmupPolicy,
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy {
            atr_period: 10,
            rsi_period: 14,
            stoch_period: 14,
            k_smooth: 3,
            d_smooth: 3,
            stop_loss_atr: dec!(1.5),
            take_profit_atr: dec!(2),
            oversold: dec!(20),
            min_atr: dec!(100),
            warmup_policy: WarmupPolicy::Reference,
        }
    }
}

impl Strategy {
    pub fn stoch_rsi_params(&self) -> StochRsiParams {
        StochRsiParams {
            rsi_period: self.rsi_period,
            stoch_period: self.stoch_period,
            k_smooth: self.k_smooth,
            d_smooth: self.d_smooth,
        }
    }

    /// Candles needed before the signal line can leave warm-up.
    pub fn minimum_candles(&self) -> usize {
        self.stoch_period + self.rsi_period
    }

    pub fn stop_loss(&self, entry_price: Decimal, atr: Decimal) -> Decimal {
        entry_price - self.stop_loss_atr * atr
    }

    pub fn take_profit(&self, entry_price: Decimal, atr: Decimal) -> Decimal {
        entry_price + self.take_profit_atr * atr
    }

    /// Fixed-fractional sizing: losing the full stop distance costs exactly
    /// `risk_percent` of `equity`. `None` when the size is not representable.
    pub fn position_size(
        &self,
        equity: Decimal,
        risk_percent: Decimal,
        atr: Decimal,
    ) -> Option<Decimal> {
        let risk = equity.checked_mul(risk_percent)?;
        let stop_distance = self.stop_loss_atr.checked_mul(atr)?;
        risk.checked_div(stop_distance)
    }
}
