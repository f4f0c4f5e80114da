//! Completed currency conversions.

use chrono::{DateTime, Utc};
use denomina_common::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FxError, FxResult};
use crate::rate::{CurrencyPair, FxRate};

/// Record of a completed conversion.
///
/// `output` is `input * rate` at full precision. Rounding to a currency's
/// smallest unit is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub id: Uuid,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub input: Decimal,
    pub output: Decimal,
    pub rate: Decimal,
    /// When the rate was quoted.
    pub quoted_at: DateTime<Utc>,
    /// Provider that quoted the rate.
    pub source: String,
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Convert `input` at a quoted rate.
    pub fn at_rate(input: Decimal, rate: &FxRate) -> FxResult<Self> {
        let output = input.checked_mul(rate.rate).ok_or(FxError::Overflow {
            amount: input,
            rate: rate.rate,
        })?;

        Ok(Self {
            id: Uuid::now_v7(),
            from: rate.pair.from.clone(),
            to: rate.pair.to.clone(),
            input,
            output,
            rate: rate.rate,
            quoted_at: rate.quoted_at,
            source: rate.source.clone(),
            executed_at: Utc::now(),
        })
    }

    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(self.from.clone(), self.to.clone())
    }
}
