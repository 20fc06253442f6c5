//! Currency rounding helpers

use bigdecimal::{BigDecimal, RoundingMode};

/// Round a monetary amount to 2 decimal places, half-up.
///
/// All settlement amounts produced by the crate go through this helper;
/// any other rounding mode changes what the authority re-derives.
pub fn round_currency(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_up_at_midpoint() {
        assert_eq!(round_currency(&dec("1.005")), dec("1.01"));
        assert_eq!(round_currency(&dec("1.004")), dec("1.00"));
        assert_eq!(round_currency(&dec("2.675")), dec("2.68"));
    }

    #[test]
    fn test_round_preserves_two_place_values() {
        assert_eq!(round_currency(&dec("67.50")), dec("67.50"));
        assert_eq!(round_currency(&dec("0")), dec("0.00"));
    }

    #[test]
    fn test_round_expands_short_scales() {
        assert_eq!(round_currency(&dec("7.5")), dec("7.50"));
        assert_eq!(round_currency(&dec("100")), dec("100.00"));
    }
}
