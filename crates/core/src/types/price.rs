//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts travel through the API in major units (`"499.50"`). Payment
//! gateways want integer minor units (`49950`), so conversion lives here
//! instead of in every caller.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors produced when validating or converting a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// Amount is zero where a charge is required.
    #[error("amount must be greater than zero")]
    Zero,
    /// More fractional digits than the currency's minor unit allows.
    #[error("amount has more than {0} decimal places")]
    TooPrecise(u32),
    /// Does not fit in an `i64` of minor units.
    #[error("amount is too large")]
    Overflow,
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g. rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Convert to integer minor units (paise, cents).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more fractional digits
    /// than the currency allows, or overflows `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let exponent = self.currency_code.minor_unit_exponent();
        if self.amount.normalize().scale() > exponent {
            return Err(PriceError::TooPrecise(exponent));
        }
        let factor = Decimal::from(10_i64.pow(exponent));
        self.amount
            .checked_mul(factor)
            .and_then(|minor| minor.to_i64())
            .ok_or(PriceError::Overflow)
    }

    /// Like [`Price::to_minor_units`] but also rejects zero.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Zero`] for a zero amount, otherwise the same
    /// errors as [`Price::to_minor_units`].
    pub fn to_chargeable_minor_units(&self) -> Result<i64, PriceError> {
        match self.to_minor_units()? {
            0 => Err(PriceError::Zero),
            minor => Ok(minor),
        }
    }
}

/// ISO 4217 currency codes accepted by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Number of fractional digits in the minor unit.
    #[must_use]
    pub const fn minor_unit_exponent(self) -> u32 {
        match self {
            Self::INR | Self::USD | Self::EUR | Self::GBP => 2,
        }
    }

    /// The three-letter code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn inr(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap(), CurrencyCode::INR)
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(inr("499.50").to_minor_units(), Ok(49_950));
        assert_eq!(inr("10").to_minor_units(), Ok(1_000));
        // Trailing zeros beyond the exponent are fine
        assert_eq!(inr("1.2300").to_minor_units(), Ok(123));
    }

    #[test]
    fn test_minor_units_rejects_sub_paise() {
        assert_eq!(inr("0.005").to_minor_units(), Err(PriceError::TooPrecise(2)));
    }

    #[test]
    fn test_minor_units_rejects_negative() {
        assert_eq!(inr("-1").to_minor_units(), Err(PriceError::Negative));
    }

    #[test]
    fn test_chargeable_rejects_zero() {
        assert_eq!(inr("0.00").to_chargeable_minor_units(), Err(PriceError::Zero));
    }

    #[test]
    fn test_currency_serializes_as_code() {
        assert_eq!(serde_json::to_string(&CurrencyCode::INR).unwrap(), "\"INR\"");
    }
}
