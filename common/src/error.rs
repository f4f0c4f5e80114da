//! Error types for Denomina operations.

use thiserror::Error;

/// Main error type for denomination calculations.
///
/// Every variant is a local, recoverable validation failure. None of them
/// is retryable: the engines are pure computations and retries belong to
/// the I/O layers around them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenominaError {
    /// Amount is non-positive, not a decimal, or not a multiple of the
    /// currency's smallest unit.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Currency code is malformed, unknown, or inactive.
    #[error("Unsupported currency: {code}: {reason}")]
    UnsupportedCurrency { code: String, reason: String },

    /// Optimization mode string that does not name a known mode.
    #[error("Unknown optimization mode: {0}")]
    UnknownOptimizationMode(String),

    /// Constraint references a denomination the currency lacks, or carries
    /// an invalid value.
    #[error("Constraint error: {0}")]
    ConstraintError(String),

    /// Currency configuration source could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Arithmetic exceeded the representable decimal range.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

impl DenominaError {
    /// Create an invalid amount error.
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        DenominaError::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Create an unsupported currency error.
    pub fn unsupported_currency(code: impl Into<String>, reason: impl Into<String>) -> Self {
        DenominaError::UnsupportedCurrency {
            code: code.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for serialized responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            DenominaError::InvalidAmount { .. } => "INVALID_AMOUNT",
            DenominaError::UnsupportedCurrency { .. } => "UNSUPPORTED_CURRENCY",
            DenominaError::UnknownOptimizationMode(_) => "UNKNOWN_OPTIMIZATION_MODE",
            DenominaError::ConstraintError(_) => "CONSTRAINT_ERROR",
            DenominaError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            DenominaError::Overflow(_) => "OVERFLOW",
        }
    }
}

/// Result type alias for Denomina operations.
pub type Result<T> = std::result::Result<T, DenominaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DenominaError::invalid_amount("negative").error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            DenominaError::unsupported_currency("XXX", "not configured").error_code(),
            "UNSUPPORTED_CURRENCY"
        );
        assert_eq!(
            DenominaError::ConstraintError("bad".into()).error_code(),
            "CONSTRAINT_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = DenominaError::unsupported_currency("XXX", "not configured");
        assert_eq!(err.to_string(), "Unsupported currency: XXX: not configured");
    }
}
