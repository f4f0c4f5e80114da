//! Monetary primitives: currency codes and exact minor-unit scaling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DenominaError, Result};

/// Largest mantissa a `Decimal` can carry (2^96 - 1).
const MAX_MANTISSA: u128 = 79_228_162_514_264_337_593_543_950_335;

/// ISO 4217-style three-letter currency code, always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code.
    ///
    /// Leading/trailing whitespace is ignored and the code is uppercased.
    /// Anything other than exactly three ASCII letters is rejected.
    pub fn parse(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_uppercase();
        if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DenominaError::unsupported_currency(
                code,
                "currency code must be exactly 3 letters",
            ));
        }
        Ok(Self(normalized))
    }

    /// US Dollar.
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Euro.
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    /// British Pound.
    pub fn gbp() -> Self {
        Self("GBP".to_string())
    }

    /// Indian Rupee.
    pub fn inr() -> Self {
        Self("INR".to_string())
    }

    /// Get the currency code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DenominaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DenominaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Express a non-negative decimal as an integer count of `10^-scale` units.
///
/// Returns `None` when the value is negative, carries more fractional
/// digits than `scale`, or the scaled value does not fit in a `u128`.
pub fn to_minor_units(value: Decimal, scale: u32) -> Option<u128> {
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    let value = value.normalize();
    let value_scale = value.scale();
    if value_scale > scale {
        return None;
    }
    let mantissa = u128::try_from(value.mantissa()).ok()?;
    let factor = 10u128.checked_pow(scale - value_scale)?;
    mantissa.checked_mul(factor)
}

/// Inverse of [`to_minor_units`].
///
/// Trailing zeros are shed while the mantissa is too wide for a `Decimal`,
/// so any value that is representable at some scale is recovered exactly.
pub fn from_minor_units(mut units: u128, mut scale: u32) -> Option<Decimal> {
    while units > MAX_MANTISSA && scale > 0 && units % 10 == 0 {
        units /= 10;
        scale -= 1;
    }
    if units > MAX_MANTISSA {
        return None;
    }
    let mantissa = i128::try_from(units).ok()?;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Common scale needed to express every value as whole minor units.
pub fn common_scale<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> u32 {
    values
        .into_iter()
        .map(|v| v.normalize().scale())
        .max()
        .unwrap_or(0)
}
