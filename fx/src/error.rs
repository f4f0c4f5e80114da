//! FX error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::rate::CurrencyPair;

/// Errors that can occur during rate lookup or conversion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FxError {
    /// No provider has a rate for the pair.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// A provider returned a zero or negative rate.
    #[error("Invalid rate {rate} for {pair}")]
    InvalidRate { pair: CurrencyPair, rate: Decimal },

    /// Provider failed for a reason other than a missing pair.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// The converted amount does not fit in a decimal.
    #[error("Conversion overflow: {amount} at rate {rate}")]
    Overflow { amount: Decimal, rate: Decimal },
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
