//! RSI (Relative Strength Index) indicator implementation.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n price changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss)), evaluated as
//! 100 * avg_gain / (avg_gain + avg_loss) so a tiny avg_loss cannot overflow.
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n closes are undefined (need n price changes to compute initial average).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::indicator::{IndicatorSeries, IndicatorType};

fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss == Decimal::ZERO {
        dec!(100)
    } else {
        avg_gain / (avg_gain + avg_loss) * dec!(100)
    }
}

pub fn calculate_rsi(closes: &[Decimal], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi(period);
    if period == 0 || closes.len() <= period {
        return IndicatorSeries::undefined(indicator_type, closes.len());
    }

    let changes: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: Decimal| if c > Decimal::ZERO { c } else { Decimal::ZERO };
    let loss = |c: Decimal| if c < Decimal::ZERO { -c } else { Decimal::ZERO };

    let period_d = Decimal::from(period as u64);
    let period_minus_1 = Decimal::from(period as u64 - 1);

    let mut avg_gain = changes[..period].iter().map(|&c| gain(c)).sum::<Decimal>() / period_d;
    let mut avg_loss = changes[..period].iter().map(|&c| loss(c)).sum::<Decimal>() / period_d;

    let mut values = vec![None; period];
    values.push(Some(rsi_from_averages(avg_gain, avg_loss)));

    for &change in &changes[period..] {
        avg_gain = (avg_gain * period_minus_1 + gain(change)) / period_d;
        avg_loss = (avg_loss * period_minus_1 + loss(change)) / period_d;
        values.push(Some(rsi_from_averages(avg_gain, avg_loss)));
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(count: usize) -> Vec<Decimal> {
        (0..count).map(|i| dec!(100) + Decimal::from(i as u64)).collect()
    }

    #[test]
    fn rsi_empty_closes() {
        let series = calculate_rsi(&[], 14);
        assert!(series.is_empty());
    }

    #[test]
    fn rsi_single_close() {
        let series = calculate_rsi(&[dec!(100)], 14);
        assert_eq!(series.values, vec![None]);
    }

    #[test]
    fn rsi_length_matches_closes() {
        let series = calculate_rsi(&rising(20), 14);
        assert_eq!(series.len(), 20);
    }

    #[test]
    fn rsi_warmup_period() {
        let closes: Vec<Decimal> = (1..=15)
            .map(|i| dec!(100) + Decimal::from(i % 5) * dec!(2))
            .collect();
        let series = calculate_rsi(&closes, 14);

        for i in 0..14 {
            assert!(series.values[i].is_none(), "close {} should be undefined", i);
        }
        assert!(series.values[14].is_some(), "close 14 should be defined");
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let series = calculate_rsi(&rising(20), 14);
        assert_eq!(series.values[14], Some(dec!(100)));
        for value in &series.values[14..] {
            assert_eq!(*value, Some(dec!(100)));
        }
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let closes: Vec<Decimal> = (0..15).map(|i| dec!(100) - Decimal::from(i)).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.values[14], Some(dec!(0)));
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        // +1, -1 alternating over 4 changes: avg gain == avg loss → RS 1 → 50
        let closes = vec![dec!(10), dec!(11), dec!(10), dec!(11), dec!(10)];
        let series = calculate_rsi(&closes, 4);
        assert_eq!(series.values[4], Some(dec!(50)));
    }

    #[test]
    fn rsi_wilder_smoothing_step() {
        // period 2: changes +2, -2 → avg 1/1 → 50; next change +4:
        // gain = (1*1 + 4)/2 = 2.5, loss = (1*1 + 0)/2 = 0.5, RS = 5 → 100 - 100/6
        let closes = vec![dec!(10), dec!(12), dec!(10), dec!(14)];
        let series = calculate_rsi(&closes, 2);
        assert_eq!(series.values[2], Some(dec!(50)));
        let expected = dec!(100) - dec!(100) / dec!(6);
        assert_eq!(series.values[3].map(|v| v.round_dp(20)), Some(expected.round_dp(20)));
    }

    #[test]
    fn rsi_in_range() {
        let closes: Vec<Decimal> = (1..=40)
            .map(|i| dec!(100) + (Decimal::from(i % 7) - dec!(3)) * dec!(2))
            .collect();
        let series = calculate_rsi(&closes, 14);

        for value in series.values.iter().flatten() {
            assert!(*value >= dec!(0) && *value <= dec!(100), "RSI {} out of range", value);
        }
    }

    #[test]
    fn rsi_tiny_average_loss_stays_in_range() {
        // One loss of 1.4e-28 followed by large gains: avg_loss is near the
        // smallest representable value while avg_gain is large.
        let mut closes = vec![dec!(1.0000000000000000000000000014), dec!(1.0)];
        closes.extend((1..=13).map(|i| Decimal::from(i * 10 + 1)));
        let series = calculate_rsi(&closes, 14);

        let value = series.values[14].unwrap();
        assert!(value > dec!(99.99) && value <= dec!(100), "RSI {} out of range", value);
    }

    #[test]
    fn rsi_zero_period() {
        let series = calculate_rsi(&[dec!(100), dec!(101)], 0);
        assert_eq!(series.values, vec![None, None]);
    }

    #[test]
    fn rsi_indicator_type() {
        let series = calculate_rsi(&[dec!(100)], 14);
        assert_eq!(series.indicator_type, IndicatorType::Rsi(14));
    }
}
