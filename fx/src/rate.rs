//! Currency pairs and quoted rates.

use chrono::{DateTime, Utc};
use denomina_common::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directed currency pair: one unit of `from` buys `rate` units of `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// The same pair in the opposite direction.
    pub fn inverse(&self) -> Self {
        Self::new(self.to.clone(), self.from.clone())
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A rate quote from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pub pair: CurrencyPair,
    pub rate: Decimal,
    pub quoted_at: DateTime<Utc>,
    /// Name of the provider that quoted the rate.
    pub source: String,
}

impl FxRate {
    pub fn new(pair: CurrencyPair, rate: Decimal, source: impl Into<String>) -> Self {
        Self {
            pair,
            rate,
            quoted_at: Utc::now(),
            source: source.into(),
        }
    }

    /// Rate of 1 for a currency into itself.
    pub fn identity(currency: CurrencyCode) -> Self {
        Self::new(
            CurrencyPair::new(currency.clone(), currency),
            Decimal::ONE,
            "IDENTITY",
        )
    }
}
