//! The currency registry.

use std::collections::BTreeMap;
use std::path::Path;

use denomina_common::{CurrencyCode, DenominaError, Result};
use tracing::{debug, info};

use crate::config::CurrencyConfig;

/// Definitions shipped with the crate.
const BUILTIN_CURRENCIES: &str = include_str!("../data/currencies.json");

/// Immutable mapping from currency code to configuration.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    currencies: BTreeMap<CurrencyCode, CurrencyConfig>,
}

impl CurrencyRegistry {
    /// Registry of the built-in currency definitions.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CURRENCIES)
    }

    /// Load a registry from a JSON file keyed by currency code.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            DenominaError::ConfigurationError(format!("reading {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "Loading currency definitions");
        Self::from_json_str(&source)
    }

    /// Parse a registry from JSON text keyed by currency code.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let raw: BTreeMap<String, CurrencyConfig> = serde_json::from_str(source)
            .map_err(|e| DenominaError::ConfigurationError(format!("currency definitions: {e}")))?;

        let mut currencies = BTreeMap::new();
        for (key, config) in raw {
            let code = CurrencyCode::parse(&key)
                .map_err(|e| DenominaError::ConfigurationError(e.to_string()))?;
            if code != config.code {
                return Err(DenominaError::ConfigurationError(format!(
                    "entry {key} declares code {}",
                    config.code
                )));
            }
            currencies.insert(code, config);
        }

        Ok(Self::from_configs(currencies.into_values()))
    }

    /// Build a registry from already-validated configurations.
    pub fn from_configs(configs: impl IntoIterator<Item = CurrencyConfig>) -> Self {
        let currencies: BTreeMap<CurrencyCode, CurrencyConfig> = configs
            .into_iter()
            .map(|config| (config.code.clone(), config))
            .collect();

        info!(
            currencies = currencies.len(),
            active = currencies.values().filter(|c| c.active).count(),
            "Currency registry loaded"
        );

        Self { currencies }
    }

    /// Configuration for an active currency.
    pub fn get(&self, code: &CurrencyCode) -> Result<&CurrencyConfig> {
        let config = self.currencies.get(code).ok_or_else(|| {
            DenominaError::unsupported_currency(
                code.as_str(),
                format!("not configured; available: {}", self.supported_codes().join(", ")),
            )
        })?;

        if !config.active {
            return Err(DenominaError::unsupported_currency(
                code.as_str(),
                "currency is not currently active",
            ));
        }

        Ok(config)
    }

    /// Active currency codes, sorted.
    pub fn supported_codes(&self) -> Vec<String> {
        self.currencies
            .values()
            .filter(|c| c.active)
            .map(|c| c.code.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn test_builtin_registry() {
        let registry = CurrencyRegistry::builtin().unwrap();
        assert!(registry.len() >= 4);

        let inr = registry.get(&code("INR")).unwrap();
        assert_eq!(inr.all_denominations()[0], dec!(2000));
        assert!(inr.is_note(dec!(500)));
        assert!(inr.is_coin(dec!(1)));

        let usd = registry.get(&code("USD")).unwrap();
        assert_eq!(usd.smallest_unit, dec!(0.01));
    }

    #[test]
    fn test_unknown_currency() {
        let registry = CurrencyRegistry::builtin().unwrap();
        let err = registry.get(&code("XXX")).unwrap_err();
        assert!(matches!(err, DenominaError::UnsupportedCurrency { .. }));
    }

    #[test]
    fn test_inactive_currency() {
        let json = r#"{
            "OLD": {"code": "OLD", "name": "Old", "symbol": "O", "decimal_places": 0,
                    "notes": ["10"], "coins": ["1"], "smallest_unit": "1", "active": false},
            "NEW": {"code": "NEW", "name": "New", "symbol": "N", "decimal_places": 0,
                    "notes": ["10"], "coins": ["1"], "smallest_unit": "1"}
        }"#;
        let registry = CurrencyRegistry::from_json_str(json).unwrap();

        assert!(matches!(
            registry.get(&code("OLD")),
            Err(DenominaError::UnsupportedCurrency { .. })
        ));
        assert!(registry.get(&code("NEW")).is_ok());
        assert_eq!(registry.supported_codes(), vec!["NEW".to_string()]);
    }

    #[test]
    fn test_key_code_mismatch() {
        let json = r#"{
            "ABC": {"code": "XYZ", "name": "X", "symbol": "X", "decimal_places": 0,
                    "notes": ["10"], "coins": [], "smallest_unit": "1"}
        }"#;
        assert!(matches!(
            CurrencyRegistry::from_json_str(json),
            Err(DenominaError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_malformed_source() {
        assert!(matches!(
            CurrencyRegistry::from_json_str("not json"),
            Err(DenominaError::ConfigurationError(_))
        ));
        assert!(CurrencyRegistry::from_path("/nonexistent/currencies.json").is_err());
    }
}
