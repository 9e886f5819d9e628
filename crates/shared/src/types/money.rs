//! Money type with decimal precision and currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of fraction digits shown when an amount is presented.
pub const PRESENTATION_SCALE: u32 = 2;

/// Rounds an amount for presentation (2 decimal places, Banker's Rounding).
///
/// Intermediate sums keep full precision; call this only on values that are
/// about to be shown.
#[must_use]
pub fn round_for_presentation(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PRESENTATION_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// ISO 4217 alphabetic currency code (e.g. "USD", "IDR").
///
/// Stored as three uppercase ASCII letters so the type stays `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// US Dollar, the fallback when a company has no configured currency.
    pub const USD: Self = Self(*b"USD");

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII uppercase letters.
        std::str::from_utf8(&self.0).unwrap_or("XXX")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::USD
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bytes = upper.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(format!("Invalid ISO 4217 currency code: {s}"));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// Represents a monetary amount with currency.
///
/// Uses `Decimal` internally to avoid floating-point precision errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in major currency units, full precision.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns a copy rounded for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self::new(round_for_presentation(self.amount), self.currency)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", round_for_presentation(self.amount), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_new() {
        let amount = dec!(100.00);
        let money = Money::new(amount, CurrencyCode::USD);
        assert_eq!(money.amount, amount);
        assert_eq!(money.currency, CurrencyCode::USD);
    }

    #[test]
    fn test_money_zero() {
        let idr = CurrencyCode::from_str("IDR").unwrap();
        let money = Money::zero(idr);
        assert!(money.is_zero());
        assert_eq!(money.currency, idr);
    }

    #[test]
    fn test_money_is_negative() {
        assert!(!Money::new(dec!(10), CurrencyCode::USD).is_negative());
        assert!(Money::new(dec!(-10), CurrencyCode::USD).is_negative());
        assert!(!Money::new(dec!(0), CurrencyCode::USD).is_negative());
    }

    #[test]
    fn test_money_display_rounds() {
        let money = Money::new(dec!(1234.5678), CurrencyCode::USD);
        assert_eq!(money.to_string(), "1234.57 USD");
    }

    #[rstest]
    #[case(dec!(0.125), dec!(0.12))]
    #[case(dec!(0.135), dec!(0.14))]
    #[case(dec!(-2.675), dec!(-2.68))]
    #[case(dec!(100), dec!(100))]
    fn test_round_for_presentation_uses_bankers_rounding(
        #[case] input: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(round_for_presentation(input), expected);
    }

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" eur ", "EUR")]
    fn test_currency_code_parses(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::from_str(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDX")]
    #[case("U5D")]
    fn test_currency_code_rejects_invalid(#[case] input: &str) {
        assert!(CurrencyCode::from_str(input).is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let json = serde_json::to_string(&CurrencyCode::USD).unwrap();
        assert_eq!(json, "\"USD\"");
        let back: CurrencyCode = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(back.as_str(), "JPY");
        assert!(serde_json::from_str::<CurrencyCode>("\"dollars\"").is_err());
    }
}
