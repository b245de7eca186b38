//! Quantization of order quantities and prices to venue-legal strings
//!
//! Bybit enforces strict numeric formatting: a quantity must be a multiple
//! of the instrument's qtyStep and carry exactly as many decimals as the
//! step, and prices are formatted to the tick precision.

use rust_decimal::Decimal;

/// Floor `raw` to the nearest multiple of `step` and format it with the
/// step's decimal precision.
///
/// Always rounds down. Rounding up would submit a larger quantity than the
/// risk budget allows.
pub fn quantize_qty(raw: Decimal, step: Decimal) -> String {
    if step.is_zero() {
        return raw.normalize().to_string();
    }
    let steps = (raw / step).floor();
    let mut qty = steps * step;
    qty.rescale(step.scale());
    qty.to_string()
}

/// Format a price to the tick's decimal precision.
///
/// Prices track the input exactly apart from precision; there is no
/// flooring requirement.
pub fn quantize_price(raw: Decimal, tick: Decimal) -> String {
    let mut price = raw.round_dp(tick.scale());
    price.rescale(tick.scale());
    price.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_qty_floors_to_step() {
        assert_eq!(quantize_qty(dec!(0.2599), dec!(0.001)), "0.259");
        assert_eq!(quantize_qty(dec!(0.25), dec!(0.1)), "0.2");
        assert_eq!(quantize_qty(dec!(7.9), dec!(1)), "7");
    }

    #[test]
    fn test_qty_never_rounds_up() {
        // 0.1999... must not become 0.2
        assert_eq!(quantize_qty(dec!(0.1999), dec!(0.1)), "0.1");
    }

    #[test]
    fn test_qty_precision_matches_step() {
        assert_eq!(quantize_qty(dec!(1.5), dec!(0.001)), "1.500");
        assert_eq!(quantize_qty(dec!(3), dec!(1)), "3");
        assert_eq!(quantize_qty(dec!(0.2), dec!(0.1)), "0.2");
    }

    #[test]
    fn test_qty_is_idempotent() {
        let once = quantize_qty(dec!(0.2599), dec!(0.001));
        let twice = quantize_qty(once.parse().unwrap(), dec!(0.001));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_qty_result_properties() {
        // result <= raw and an exact multiple of step
        let cases = [
            (dec!(0.37), dec!(0.01)),
            (dec!(12.345), dec!(0.5)),
            (dec!(0.0001), dec!(0.001)),
        ];
        for (raw, step) in cases {
            let quantized: Decimal = quantize_qty(raw, step).parse().unwrap();
            assert!(quantized <= raw, "{} > {}", quantized, raw);
            assert!((quantized % step).is_zero(), "{} % {} != 0", quantized, step);
        }
    }

    #[test]
    fn test_price_formats_to_tick() {
        assert_eq!(quantize_price(dec!(100), dec!(0.10)), "100.00");
        assert_eq!(quantize_price(dec!(95.456), dec!(0.01)), "95.46");
        assert_eq!(quantize_price(dec!(27123), dec!(1)), "27123");
    }

    #[test]
    fn test_below_one_step_floors_to_zero() {
        assert_eq!(quantize_qty(dec!(0.0004), dec!(0.001)), "0.000");
    }
}
