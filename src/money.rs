//! Fixed-scale decimal arithmetic for the ledger.
//!
//! Every monetary amount in the kernel is quantized to six fractional
//! digits by truncation toward zero, never by rounding. This matches the
//! `Decimal(...).quantize(QUANTA)` behavior the ledger was modeled on.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits every amount is quantized to.
pub const SCALE: u32 = 6;

/// Quantize `value` to [`SCALE`] fractional digits, truncating toward zero.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SCALE, RoundingStrategy::ToZero)
}

/// `true` if `value` is exactly zero after quantization.
pub fn is_zero(value: Decimal) -> bool {
    quantize(value).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantize_truncates_rather_than_rounds() {
        assert_eq!(quantize(dec!(1.0000005)), dec!(1.000000));
        assert_eq!(quantize(dec!(1.9999999)), dec!(1.999999));
        assert_eq!(quantize(dec!(-1.9999999)), dec!(-1.999999));
    }

    #[test]
    fn quantize_is_idempotent() {
        let once = quantize(dec!(3.14159265));
        assert_eq!(quantize(once), once);
    }
}
