//! Denomination configuration for a single currency.

use denomina_common::{CurrencyCode, DenominaError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for a single currency.
///
/// Notes and coins are disjoint, every denomination is positive, and
/// `smallest_unit` never exceeds the smallest denomination. These hold for
/// every instance because construction goes through [`CurrencyConfig::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCurrencyConfig", into = "RawCurrencyConfig")]
pub struct CurrencyConfig {
    pub code: CurrencyCode,
    pub name: String,
    pub symbol: String,
    pub decimal_places: u32,
    pub smallest_unit: Decimal,
    pub active: bool,
    notes: Vec<Decimal>,
    coins: Vec<Decimal>,
    all_denominations: Vec<Decimal>,
}

impl CurrencyConfig {
    /// Create and validate a currency configuration.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: CurrencyCode,
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimal_places: u32,
        notes: Vec<Decimal>,
        coins: Vec<Decimal>,
        smallest_unit: Decimal,
        active: bool,
    ) -> Result<Self> {
        let notes = normalized_descending(notes);
        let coins = normalized_descending(coins);
        let smallest_unit = smallest_unit.normalize();

        let invalid = |reason: String| -> Result<Self> {
            Err(DenominaError::ConfigurationError(format!("{code}: {reason}")))
        };

        if notes.is_empty() && coins.is_empty() {
            return invalid("at least one denomination is required".into());
        }
        if let Some(d) = notes.iter().chain(coins.iter()).find(|d| **d <= Decimal::ZERO) {
            return invalid(format!("denomination {d} must be positive"));
        }
        if let Some(d) = notes.iter().find(|d| contains_descending(&coins, **d)) {
            return invalid(format!("{d} is listed as both a note and a coin"));
        }

        let mut all_denominations: Vec<Decimal> =
            notes.iter().chain(coins.iter()).copied().collect();
        all_denominations.sort_by(|a, b| b.cmp(a));

        if smallest_unit <= Decimal::ZERO {
            return invalid(format!("smallest unit {smallest_unit} must be positive"));
        }
        if let Some(min) = all_denominations.last() {
            if smallest_unit > *min {
                return invalid(format!(
                    "smallest unit {smallest_unit} exceeds smallest denomination {min}"
                ));
            }
        }

        Ok(Self {
            code,
            name: name.into(),
            symbol: symbol.into(),
            decimal_places,
            smallest_unit,
            active,
            notes,
            coins,
            all_denominations,
        })
    }

    /// Note denominations, descending.
    pub fn notes(&self) -> &[Decimal] {
        &self.notes
    }

    /// Coin denominations, descending.
    pub fn coins(&self) -> &[Decimal] {
        &self.coins
    }

    /// Notes and coins together, descending.
    pub fn all_denominations(&self) -> &[Decimal] {
        &self.all_denominations
    }

    pub fn is_note(&self, denomination: Decimal) -> bool {
        contains_descending(&self.notes, denomination)
    }

    pub fn is_coin(&self, denomination: Decimal) -> bool {
        contains_descending(&self.coins, denomination)
    }

    pub fn has_denomination(&self, denomination: Decimal) -> bool {
        contains_descending(&self.all_denominations, denomination)
    }
}

/// Normalize, deduplicate and sort descending.
fn normalized_descending(mut values: Vec<Decimal>) -> Vec<Decimal> {
    for value in values.iter_mut() {
        *value = value.normalize();
    }
    values.sort_by(|a, b| b.cmp(a));
    values.dedup();
    values
}

fn contains_descending(values: &[Decimal], needle: Decimal) -> bool {
    values.binary_search_by(|probe| needle.cmp(probe)).is_ok()
}

/// On-disk shape of a currency entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCurrencyConfig {
    code: CurrencyCode,
    name: String,
    symbol: String,
    decimal_places: u32,
    notes: Vec<Decimal>,
    coins: Vec<Decimal>,
    smallest_unit: Decimal,
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<RawCurrencyConfig> for CurrencyConfig {
    type Error = DenominaError;

    fn try_from(raw: RawCurrencyConfig) -> Result<Self> {
        CurrencyConfig::new(
            raw.code,
            raw.name,
            raw.symbol,
            raw.decimal_places,
            raw.notes,
            raw.coins,
            raw.smallest_unit,
            raw.active,
        )
    }
}

impl From<CurrencyConfig> for RawCurrencyConfig {
    fn from(config: CurrencyConfig) -> Self {
        Self {
            code: config.code,
            name: config.name,
            symbol: config.symbol,
            decimal_places: config.decimal_places,
            notes: config.notes,
            coins: config.coins,
            smallest_unit: config.smallest_unit,
            active: config.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config(notes: Vec<Decimal>, coins: Vec<Decimal>, smallest: Decimal) -> Result<CurrencyConfig> {
        CurrencyConfig::new(
            CurrencyCode::parse("TST").unwrap(),
            "Test",
            "T",
            2,
            notes,
            coins,
            smallest,
            true,
        )
    }

    #[test]
    fn test_all_denominations_descending() {
        let cfg = config(vec![dec!(10), dec!(50)], vec![dec!(0.50), dec!(1)], dec!(0.5)).unwrap();
        assert_eq!(
            cfg.all_denominations(),
            &[dec!(50), dec!(10), dec!(1), dec!(0.5)]
        );
        assert!(cfg.is_note(dec!(50)));
        assert!(cfg.is_coin(dec!(0.50)));
        assert!(!cfg.is_note(dec!(1)));
        assert!(cfg.has_denomination(dec!(10.00)));
        assert!(!cfg.has_denomination(dec!(20)));
    }

    #[test]
    fn test_rejects_overlap() {
        let err = config(vec![dec!(1), dec!(5)], vec![dec!(1)], dec!(1)).unwrap_err();
        assert!(matches!(err, DenominaError::ConfigurationError(_)));
        assert!(err.to_string().contains("both a note and a coin"));

        // Scale differences do not hide an overlap.
        let err = config(vec![dec!(20), dec!(2.00)], vec![dec!(2), dec!(0.5)], dec!(0.5));
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_non_positive_denomination() {
        assert!(config(vec![dec!(0)], vec![], dec!(1)).is_err());
        assert!(config(vec![dec!(-5)], vec![], dec!(1)).is_err());
    }

    #[test]
    fn test_rejects_bad_smallest_unit() {
        assert!(config(vec![dec!(5)], vec![dec!(1)], dec!(2)).is_err());
        assert!(config(vec![dec!(5)], vec![], dec!(0)).is_err());
        assert!(config(vec![], vec![], dec!(1)).is_err());
    }

    #[test]
    fn test_json_round_trip_keeps_invariants() {
        let json = r#"{
            "code": "tst", "name": "Test", "symbol": "T", "decimal_places": 2,
            "notes": ["10"], "coins": ["0.25", "1"], "smallest_unit": "0.25"
        }"#;
        let cfg: CurrencyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.code.as_str(), "TST");
        assert!(cfg.active);
        assert_eq!(cfg.coins(), &[dec!(1), dec!(0.25)]);

        let bad = r#"{
            "code": "TST", "name": "Test", "symbol": "T", "decimal_places": 2,
            "notes": ["1"], "coins": ["1"], "smallest_unit": "1"
        }"#;
        assert!(serde_json::from_str::<CurrencyConfig>(bad).is_err());
    }
}
