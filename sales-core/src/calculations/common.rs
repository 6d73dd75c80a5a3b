//! Rounding helpers shared by the totals and formatting code.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to `decimal_places` using half-up rounding.
///
/// Values exactly halfway between two representable amounts are rounded
/// away from zero, which is the usual convention for invoice amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use sales_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454), 2), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(1.0005), 3), dec!(1.001));
/// assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(
    value: Decimal,
    decimal_places: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454), 2), dec!(123.45));
    }

    #[test]
    fn rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(475.095), 2), dec!(475.10));
    }

    #[test]
    fn handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46));
    }

    #[test]
    fn preserves_already_rounded_values() {
        assert_eq!(round_half_up(dec!(35150), 2), dec!(35150));
    }

    #[test]
    fn three_decimal_places() {
        assert_eq!(round_half_up(dec!(10.0005), 3), dec!(10.001));
        assert_eq!(round_half_up(dec!(10.0004), 3), dec!(10.000));
    }

    #[test]
    fn zero_decimal_places() {
        assert_eq!(round_half_up(dec!(999.5), 0), dec!(1000));
    }
}
