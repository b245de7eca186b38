//! Risk-based position sizing and P/L arithmetic

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::common::errors::{BotError, Result};
use crate::common::types::Direction;

/// Derive the stop loss from the profit target at the fixed 1:2
/// risk:reward ratio (stop distance = profit distance / 2).
pub fn stop_from_target(direction: Direction, entry: Decimal, take_profit: Decimal) -> Decimal {
    let profit_distance = (take_profit - entry).abs();
    let risk_distance = profit_distance / dec!(2);
    match direction {
        Direction::Long => entry - risk_distance,
        Direction::Short => entry + risk_distance,
    }
}

/// Compute the raw order quantity for a fixed USD risk budget.
///
/// `stop_pct = stop_distance / reference_price`;
/// `qty = risk_usd / (reference_price * stop_pct)`.
///
/// A zero stop distance is a logically meaningless trade (and a division
/// by zero) and fails with `InvalidStop`.
pub fn size(risk_usd: Decimal, reference_price: Decimal, stop_distance: Decimal) -> Result<Decimal> {
    if reference_price.is_zero() {
        return Err(BotError::InvalidStop);
    }
    let stop_pct = stop_distance.abs() / reference_price;
    if stop_pct.is_zero() {
        return Err(BotError::InvalidStop);
    }
    Ok(risk_usd / (reference_price * stop_pct))
}

/// Percentage P/L of a closed trade, sign-flipped for shorts
pub fn pnl_percent(direction: Direction, entry: Decimal, close: Decimal) -> Decimal {
    let raw = (close - entry) / entry * dec!(100);
    match direction {
        Direction::Long => raw,
        Direction::Short => -raw,
    }
}

/// Absolute USD P/L of a closed trade
pub fn pnl_usd(direction: Direction, entry: Decimal, close: Decimal, qty: Decimal) -> Decimal {
    let raw = (close - entry) * qty;
    match direction {
        Direction::Long => raw,
        Direction::Short => -raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stop_derived_at_one_to_two() {
        // entry 100, TP 110 long: profit distance 10, risk distance 5
        assert_eq!(
            stop_from_target(Direction::Long, dec!(100), dec!(110)),
            dec!(95)
        );
        // short mirror: entry 100, TP 90
        assert_eq!(
            stop_from_target(Direction::Short, dec!(100), dec!(90)),
            dec!(105)
        );
    }

    #[test]
    fn test_size_rejects_zero_stop() {
        assert!(matches!(
            size(dec!(1), dec!(100), dec!(0)),
            Err(BotError::InvalidStop)
        ));
    }

    #[test]
    fn test_size_example_scenario() {
        // entry 100, stop 95: stop_pct 5%, risk 1 USD => qty 0.2
        let qty = size(dec!(1), dec!(100), dec!(5)).unwrap();
        assert_eq!(qty, dec!(0.2));
    }

    #[test]
    fn test_size_scales_linearly_with_risk() {
        let base = size(dec!(1), dec!(100), dec!(5)).unwrap();
        let doubled = size(dec!(2), dec!(100), dec!(5)).unwrap();
        assert_eq!(doubled, base * dec!(2));
    }

    #[test]
    fn test_size_scales_inversely_with_stop_distance() {
        let near = size(dec!(1), dec!(100), dec!(5)).unwrap();
        let far = size(dec!(1), dec!(100), dec!(10)).unwrap();
        assert_eq!(near, far * dec!(2));
    }

    #[test]
    fn test_pnl_percent_sign_flips_for_short() {
        assert_eq!(pnl_percent(Direction::Long, dec!(100), dec!(110)), dec!(10));
        assert_eq!(
            pnl_percent(Direction::Short, dec!(100), dec!(110)),
            dec!(-10)
        );
    }

    #[test]
    fn test_pnl_usd() {
        assert_eq!(
            pnl_usd(Direction::Long, dec!(100), dec!(110), dec!(0.2)),
            dec!(2.0)
        );
        assert_eq!(
            pnl_usd(Direction::Short, dec!(100), dec!(95), dec!(0.2)),
            dec!(1.0)
        );
    }
}
