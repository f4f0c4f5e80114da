//! Service configuration.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Longest accepted FX cache TTL: one week.
pub const MAX_FX_CACHE_TTL_SECS: i64 = 7 * 24 * 3600;

/// Main service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Currency definitions file. Built-in definitions when unset.
    pub currency_config: Option<PathBuf>,
    /// Largest amount accepted for a single calculation.
    pub max_amount: Decimal,
    /// Largest number of rows accepted in one batch.
    pub max_batch_rows: usize,
    /// How long a quoted FX rate is reused.
    pub fx_cache_ttl_secs: i64,
    /// Emit logs as JSON.
    pub log_json: bool,
    /// Log level when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            currency_config: None,
            max_amount: Decimal::from_i128_with_scale(10_i128.pow(21), 0),
            max_batch_rows: 100_000,
            fx_cache_ttl_secs: 3600,
            log_json: false,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("DENOMINA_CURRENCY_CONFIG") {
            if !path.is_empty() {
                config.currency_config = Some(PathBuf::from(path));
            }
        }

        if let Ok(max) = std::env::var("DENOMINA_MAX_AMOUNT") {
            if let Ok(max) = Decimal::from_str(max.trim()) {
                config.max_amount = max;
            }
        }

        if let Ok(rows) = std::env::var("DENOMINA_MAX_BATCH_ROWS") {
            if let Ok(rows) = rows.parse() {
                config.max_batch_rows = rows;
            }
        }

        if let Ok(ttl) = std::env::var("DENOMINA_FX_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                config.fx_cache_ttl_secs = ttl;
            }
        }

        if let Ok(json) = std::env::var("DENOMINA_LOG_JSON") {
            config.log_json = matches!(json.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_amount <= Decimal::ZERO {
            return Err("Maximum amount must be positive".to_string());
        }

        if self.max_batch_rows == 0 {
            return Err("Maximum batch rows cannot be 0".to_string());
        }

        if !(0..=MAX_FX_CACHE_TTL_SECS).contains(&self.fx_cache_ttl_secs) {
            return Err(format!(
                "FX cache TTL must be between 0 and {MAX_FX_CACHE_TTL_SECS} seconds"
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_batch_rows, 100_000);
        assert!(config.currency_config.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ServiceConfig::default();
        config.max_batch_rows = 0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.max_amount = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.fx_cache_ttl_secs = -1;
        assert!(config.validate().is_err());
        config.fx_cache_ttl_secs = MAX_FX_CACHE_TTL_SECS + 1;
        assert!(config.validate().is_err());
    }
}
