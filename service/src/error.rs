//! Service error types.

use denomina_common::DenominaError;
use denomina_fx::FxError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the calculator service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Calculation(#[from] DenominaError),

    #[error(transparent)]
    Fx(#[from] FxError),

    /// Amount above the configured ceiling.
    #[error("Amount {amount} exceeds maximum {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("Batch of {rows} rows exceeds maximum {max}")]
    BatchTooLarge { rows: usize, max: usize },
}

impl ServiceError {
    /// Get error code for serialized responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Calculation(e) => e.error_code(),
            ServiceError::Fx(FxError::RateNotAvailable(_)) => "RATE_NOT_AVAILABLE",
            ServiceError::Fx(FxError::InvalidRate { .. }) => "INVALID_RATE",
            ServiceError::Fx(FxError::ProviderError(_)) => "FX_PROVIDER_ERROR",
            ServiceError::Fx(FxError::Overflow { .. }) => "OVERFLOW",
            ServiceError::AmountTooLarge { .. } => "AMOUNT_TOO_LARGE",
            ServiceError::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
        }
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
