//! Calculation request/result types and the optimization mode enum.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constraint::Constraint;
use crate::error::{DenominaError, Result};
use crate::monetary::{from_minor_units, to_minor_units, CurrencyCode};

/// Free-form metadata attached to requests and results.
///
/// Ordered so that serialized results are byte-identical across runs.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Optimization strategy for a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    /// Largest denominations first; minimizes piece count for canonical systems.
    #[default]
    Greedy,
    /// Result rewritten by constraint application.
    Constrained,
    /// Smallest denominations first.
    MinimizeLarge,
    /// Reserved; currently partitions like `Greedy`.
    MinimizeSmall,
    /// Reserved; currently partitions like `Greedy`.
    Balanced,
    /// Reserved for externally suggested breakdowns; partitions like `Greedy`.
    AiSuggested,
}

impl OptimizationMode {
    /// All modes in declaration order.
    pub const ALL: [OptimizationMode; 6] = [
        OptimizationMode::Greedy,
        OptimizationMode::Constrained,
        OptimizationMode::MinimizeLarge,
        OptimizationMode::MinimizeSmall,
        OptimizationMode::Balanced,
        OptimizationMode::AiSuggested,
    ];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationMode::Greedy => "greedy",
            OptimizationMode::Constrained => "constrained",
            OptimizationMode::MinimizeLarge => "minimize_large",
            OptimizationMode::MinimizeSmall => "minimize_small",
            OptimizationMode::Balanced => "balanced",
            OptimizationMode::AiSuggested => "ai_suggested",
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationMode {
    type Err = DenominaError;

    /// Strict parse. Unknown names are an error, never a silent default.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        OptimizationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .ok_or_else(|| DenominaError::UnknownOptimizationMode(s.to_string()))
    }
}

/// Count of a single denomination within a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBreakdown")]
pub struct DenominationBreakdown {
    denomination: Decimal,
    count: u128,
    total_value: Decimal,
    is_note: bool,
}

impl DenominationBreakdown {
    /// Create a breakdown entry; `total_value` is derived as `denomination * count`.
    ///
    /// The product is taken in minor units, so counts wider than a decimal
    /// mantissa are fine as long as the total itself is representable.
    pub fn new(denomination: Decimal, count: u128, is_note: bool) -> Result<Self> {
        let scale = denomination.normalize().scale();
        let total_value = to_minor_units(denomination, scale)
            .and_then(|units| units.checked_mul(count))
            .and_then(|units| from_minor_units(units, scale))
            .ok_or_else(|| {
                DenominaError::Overflow(format!("{count} x {denomination} exceeds decimal range"))
            })?;
        Ok(Self {
            denomination,
            count,
            total_value,
            is_note,
        })
    }

    /// Same denomination with a different count.
    pub fn with_count(&self, count: u128) -> Result<Self> {
        Self::new(self.denomination, count, self.is_note)
    }

    /// Face value of the denomination.
    pub fn denomination(&self) -> Decimal {
        self.denomination
    }

    /// Number of pieces.
    pub fn count(&self) -> u128 {
        self.count
    }

    /// `denomination * count`.
    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    /// Whether the denomination is a note.
    pub fn is_note(&self) -> bool {
        self.is_note
    }

    /// Whether the denomination is a coin.
    pub fn is_coin(&self) -> bool {
        !self.is_note
    }
}

#[derive(Deserialize)]
struct RawBreakdown {
    denomination: Decimal,
    count: u128,
    total_value: Decimal,
    is_note: bool,
}

impl TryFrom<RawBreakdown> for DenominationBreakdown {
    type Error = DenominaError;

    fn try_from(raw: RawBreakdown) -> Result<Self> {
        let entry = DenominationBreakdown::new(raw.denomination, raw.count, raw.is_note)?;
        if entry.total_value != raw.total_value {
            return Err(DenominaError::invalid_amount(format!(
                "total_value {} does not equal {} x {}",
                raw.total_value, raw.count, raw.denomination
            )));
        }
        Ok(entry)
    }
}

/// Input request for a denomination calculation.
///
/// Deserialization goes through [`CalculationRequest::new`], so a decoded
/// request always carries a positive amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCalculationRequest")]
pub struct CalculationRequest {
    /// Amount to break down, in `source_currency` when that is set and
    /// differs from `currency`.
    pub amount: Decimal,
    /// Currency to break the amount into.
    pub currency: CurrencyCode,
    /// Optimization strategy.
    pub optimization_mode: OptimizationMode,
    /// Constraints, applied in order.
    pub constraints: Vec<Constraint>,
    /// Currency the amount is expressed in, for FX use.
    pub source_currency: Option<CurrencyCode>,
    /// Convert then break down (true) or break down then convert (false).
    pub convert_before_breakdown: bool,
    /// Caller metadata, copied onto the result.
    pub metadata: Metadata,
}

#[derive(Deserialize)]
struct RawCalculationRequest {
    amount: Decimal,
    currency: CurrencyCode,
    #[serde(default)]
    optimization_mode: OptimizationMode,
    #[serde(default)]
    constraints: Vec<Constraint>,
    #[serde(default)]
    source_currency: Option<CurrencyCode>,
    #[serde(default = "default_convert_before_breakdown")]
    convert_before_breakdown: bool,
    #[serde(default)]
    metadata: Metadata,
}

fn default_convert_before_breakdown() -> bool {
    true
}

impl TryFrom<RawCalculationRequest> for CalculationRequest {
    type Error = DenominaError;

    fn try_from(raw: RawCalculationRequest) -> Result<Self> {
        Ok(Self {
            optimization_mode: raw.optimization_mode,
            constraints: raw.constraints,
            source_currency: raw.source_currency,
            convert_before_breakdown: raw.convert_before_breakdown,
            metadata: raw.metadata,
            ..Self::new(raw.amount, raw.currency)?
        })
    }
}

impl CalculationRequest {
    /// Create a new request. Fails if the amount is not strictly positive.
    pub fn new(amount: Decimal, currency: CurrencyCode) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(DenominaError::invalid_amount(format!(
                "amount must be positive, got {amount}"
            )));
        }
        Ok(Self {
            amount,
            currency,
            optimization_mode: OptimizationMode::Greedy,
            constraints: Vec::new(),
            source_currency: None,
            convert_before_breakdown: true,
            metadata: Metadata::new(),
        })
    }

    /// Parse amount and currency from external strings.
    pub fn parse(amount: &str, currency: &str) -> Result<Self> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|e| DenominaError::invalid_amount(format!("{amount:?}: {e}")))?;
        Self::new(amount, CurrencyCode::parse(currency)?)
    }

    /// Use a specific optimization mode.
    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.optimization_mode = mode;
        self
    }

    /// Attach constraints.
    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Express the amount in another currency, converted before breakdown.
    pub fn with_source_currency(mut self, source: CurrencyCode) -> Self {
        self.source_currency = Some(source);
        self
    }

    /// Break down in the source currency and only report the conversion.
    pub fn breakdown_before_conversion(mut self) -> Self {
        self.convert_before_breakdown = false;
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether an FX conversion is required before the engine can run.
    pub fn needs_conversion(&self) -> bool {
        self.source_currency
            .as_ref()
            .is_some_and(|source| *source != self.currency)
    }
}

/// Output of a denomination calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Amount as requested.
    pub original_amount: Decimal,
    /// Currency of the breakdown.
    pub currency: CurrencyCode,
    /// Entries, descending by denomination.
    pub breakdowns: Vec<DenominationBreakdown>,
    pub total_notes: u128,
    pub total_coins: u128,
    /// `total_notes + total_coins`.
    pub total_denominations: u128,
    /// Mode actually used.
    pub optimization_mode: OptimizationMode,
    /// Constraints actually applied.
    pub constraints_applied: Vec<Constraint>,
    pub source_currency: Option<CurrencyCode>,
    pub exchange_rate: Option<Decimal>,
    pub converted_amount: Option<Decimal>,
    pub explanation: Option<String>,
    pub alternatives: Option<Vec<CalculationResult>>,
    pub metadata: Metadata,
}

impl CalculationResult {
    /// Build a result from a breakdown list.
    ///
    /// Entries are sorted descending and all totals are recomputed here.
    pub fn from_breakdowns(
        original_amount: Decimal,
        currency: CurrencyCode,
        mut breakdowns: Vec<DenominationBreakdown>,
        optimization_mode: OptimizationMode,
        constraints_applied: Vec<Constraint>,
        metadata: Metadata,
    ) -> Self {
        breakdowns.sort_by(|a, b| b.denomination.cmp(&a.denomination));
        let total_notes = breakdowns
            .iter()
            .filter(|b| b.is_note())
            .map(|b| b.count)
            .sum();
        let total_coins = breakdowns
            .iter()
            .filter(|b| b.is_coin())
            .map(|b| b.count)
            .sum();

        Self {
            original_amount,
            currency,
            breakdowns,
            total_notes,
            total_coins,
            total_denominations: total_notes + total_coins,
            optimization_mode,
            constraints_applied,
            source_currency: None,
            exchange_rate: None,
            converted_amount: None,
            explanation: None,
            alternatives: None,
            metadata,
        }
    }

    /// Attach FX conversion details.
    pub fn with_fx(
        mut self,
        source_currency: CurrencyCode,
        exchange_rate: Decimal,
        converted_amount: Decimal,
    ) -> Self {
        self.source_currency = Some(source_currency);
        self.exchange_rate = Some(exchange_rate);
        self.converted_amount = Some(converted_amount);
        self
    }

    /// Sum of all breakdown values.
    pub fn total_value(&self) -> Decimal {
        self.breakdowns.iter().map(|b| b.total_value).sum()
    }

    /// Amount the breakdown is meant to represent.
    ///
    /// This is the converted amount when the breakdown was made in a
    /// currency other than the source, and the original amount otherwise.
    pub fn breakdown_amount(&self) -> Decimal {
        match (&self.source_currency, self.converted_amount) {
            (Some(source), Some(converted)) if *source != self.currency => converted,
            _ => self.original_amount,
        }
    }

    /// Value not represented by the breakdown.
    pub fn shortfall(&self) -> Decimal {
        self.breakdown_amount() - self.total_value()
    }

    /// Entry for a denomination, if present.
    pub fn breakdown_for(&self, denomination: Decimal) -> Option<&DenominationBreakdown> {
        self.breakdowns
            .iter()
            .find(|b| b.denomination == denomination)
    }
}
