//! Decimal arithmetic foundation.
//!
//! Every figure in the engine is a `rust_decimal::Decimal`: a 96-bit fixed
//! mantissa giving 28–29 significant digits with no ambient, mutable
//! precision context to configure. Floats exist only at the request
//! boundary and must pass through [`decimal_from_f64`] before touching any
//! calculation. Rounding, where a calculation calls for it, is explicit
//! round-half-up via [`round_half_up`].

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::PropInvestError;
use crate::PropInvestResult;

/// Decimal places used when rounding monetary figures for display.
pub const MONEY_DP: u32 = 2;

/// Convert a boundary float into the engine's decimal type.
///
/// Rejects NaN, infinities and magnitudes outside the 96-bit range.
pub fn decimal_from_f64(field: &str, value: f64) -> PropInvestResult<Decimal> {
    if !value.is_finite() {
        return Err(PropInvestError::InvalidInput {
            field: field.into(),
            reason: format!("{value} is not a finite number"),
        });
    }

    Decimal::from_f64(value).ok_or_else(|| PropInvestError::InvalidInput {
        field: field.into(),
        reason: format!("{value} is outside the representable decimal range"),
    })
}

/// Parse a decimal from its string representation.
pub fn decimal_from_str(field: &str, raw: &str) -> PropInvestResult<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|e| PropInvestError::InvalidInput {
            field: field.into(),
            reason: format!("{raw:?} is not a valid decimal: {e}"),
        })
}

/// Round half-up (midpoint away from zero) to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary figure to cents.
pub fn round_money(value: Decimal) -> Decimal {
    round_half_up(value, MONEY_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_plain_floats() {
        assert_eq!(decimal_from_f64("price", 850000.0).unwrap(), dec!(850000));
        assert_eq!(decimal_from_f64("rate", 0.04).unwrap(), dec!(0.04));
    }

    #[test]
    fn rejects_non_finite_floats() {
        assert!(decimal_from_f64("price", f64::NAN).is_err());
        assert!(decimal_from_f64("price", f64::INFINITY).is_err());
        assert!(decimal_from_f64("price", f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn parses_strings() {
        assert_eq!(
            decimal_from_str("price", " 1020000.50 ").unwrap(),
            dec!(1020000.50)
        );
        assert!(decimal_from_str("price", "not-a-number").is_err());
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round_half_up(dec!(2.5), 0), dec!(3));
        // Half-up on magnitude, not banker's rounding
        assert_eq!(round_half_up(dec!(-2.5), 0), dec!(-3));
        assert_eq!(round_money(dec!(41827.775)), dec!(41827.78));
    }
}
