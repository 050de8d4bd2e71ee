//! Currency codes and decimal money helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end, and every derived
//! percentage or projection is computed on `Decimal` as well.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Number of decimal places a stored amount may carry (whole cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// ISO 4217 currency code, normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Returns the three-letter code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(format!("Unknown currency: {s}"))
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Validates a user-supplied transaction amount.
///
/// Amounts must be strictly positive and representable in whole minor units.
///
/// # Errors
///
/// Returns `AppError::Validation` otherwise.
pub fn validate_amount(amount: Decimal) -> AppResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if amount.normalize().scale() > MINOR_UNIT_SCALE {
        return Err(AppError::Validation(format!(
            "Amount {amount} has more than {MINOR_UNIT_SCALE} decimal places"
        )));
    }
    Ok(amount)
}

/// Parses a currency code, mapping failures to a validation error.
///
/// # Errors
///
/// Returns `AppError::Validation` for anything that is not a three-letter code.
pub fn parse_currency(code: &str) -> AppResult<Currency> {
    code.parse().map_err(AppError::Validation)
}

/// `100 * part / whole` at full precision; zero when `whole` is zero.
///
/// Threshold comparisons use this value. Only what is shown gets rounded.
#[must_use]
pub fn exact_percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// [`exact_percentage`] rounded to two places for display.
#[must_use]
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    exact_percentage(part, whole).round_dp(2)
}

/// Floors negative values at zero.
#[must_use]
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" idr ", "IDR")]
    fn test_currency_parse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(Currency::from_str(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("US1")]
    #[case("EURO")]
    fn test_currency_rejects_malformed(#[case] input: &str) {
        assert!(Currency::from_str(input).is_err());
        assert!(matches!(
            parse_currency(input),
            Err(AppError::Validation(_))
        ));
    }

    #[rstest]
    #[case(dec!(0.01))]
    #[case(dec!(300))]
    #[case(dec!(12.50))]
    #[case(dec!(12.500))]
    fn test_validate_amount_accepts(#[case] amount: Decimal) {
        assert_eq!(validate_amount(amount).unwrap(), amount);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(0.001))]
    #[case(dec!(10.125))]
    fn test_validate_amount_rejects(#[case] amount: Decimal) {
        assert!(matches!(
            validate_amount(amount),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_exact_percentage_keeps_precision() {
        assert!(exact_percentage(dec!(1000.01), dec!(1000)) > dec!(100));
        assert!(exact_percentage(dec!(2699.90), dec!(3000)) < dec!(90));
        assert_eq!(percentage_of(dec!(2699.90), dec!(3000)), dec!(90));
        assert_eq!(exact_percentage(dec!(5), dec!(0)), dec!(0));
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(dec!(90), dec!(100)), dec!(90));
        assert_eq!(percentage_of(dec!(1), dec!(3)), dec!(33.33));
        assert_eq!(percentage_of(dec!(50), dec!(0)), dec!(0));
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(dec!(-1)), dec!(0));
        assert_eq!(non_negative(dec!(4.5)), dec!(4.5));
    }
}
