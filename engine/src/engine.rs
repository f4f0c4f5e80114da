//! Main denomination engine implementation.

use std::sync::Arc;

use denomina_common::{
    CalculationRequest, CalculationResult, CurrencyCode, DenominaError, OptimizationMode, Result,
};
use denomina_registry::{CurrencyConfig, CurrencyRegistry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::partition::greedy_partition;

/// Modes tried, in order, when generating alternatives.
const ALTERNATIVE_MODES: [OptimizationMode; 4] = [
    OptimizationMode::Greedy,
    OptimizationMode::MinimizeLarge,
    OptimizationMode::Balanced,
    OptimizationMode::MinimizeSmall,
];

/// Read-only projection of a currency's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub name: String,
    pub symbol: String,
    pub decimal_places: u32,
    pub notes: Vec<Decimal>,
    pub coins: Vec<Decimal>,
    pub smallest_unit: Decimal,
    pub total_denominations: usize,
}

impl From<&CurrencyConfig> for CurrencyInfo {
    fn from(config: &CurrencyConfig) -> Self {
        Self {
            code: config.code.clone(),
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            decimal_places: config.decimal_places,
            notes: config.notes().to_vec(),
            coins: config.coins().to_vec(),
            smallest_unit: config.smallest_unit,
            total_denominations: config.all_denominations().len(),
        }
    }
}

/// Stateless denomination engine.
///
/// The only shared state is the immutable registry, so an engine can be
/// cloned freely and used from any number of threads at once.
#[derive(Debug, Clone)]
pub struct DenominationEngine {
    registry: Arc<CurrencyRegistry>,
}

impl DenominationEngine {
    /// Create an engine over the given registry.
    pub fn new(registry: Arc<CurrencyRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Configuration for an active currency.
    pub fn currency_config(&self, code: &CurrencyCode) -> Result<&CurrencyConfig> {
        self.registry.get(code)
    }

    /// Break the request amount down into notes and coins.
    ///
    /// Constraints on the request are not applied here; the result's
    /// `constraints_applied` is always empty.
    #[instrument(skip(self, request), fields(
        amount = %request.amount,
        currency = %request.currency,
        mode = %request.optimization_mode
    ))]
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        if request.amount <= Decimal::ZERO {
            return Err(DenominaError::invalid_amount(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }

        let config = self.currency_config(&request.currency)?;
        let order = Self::denominations_for_mode(config, request.optimization_mode);
        let partition = greedy_partition(request.amount, &order, config)?;

        if !partition.remainder.is_zero() {
            if partition.representable_remainder.is_zero() {
                debug!(
                    remainder = %partition.remainder,
                    smallest_unit = %config.smallest_unit,
                    "Discarding residue below smallest unit"
                );
            } else {
                warn!(
                    remainder = %partition.remainder,
                    "Denominations cannot represent the full amount"
                );
            }
        }

        let result = CalculationResult::from_breakdowns(
            request.amount,
            request.currency.clone(),
            partition.breakdowns,
            request.optimization_mode,
            Vec::new(),
            request.metadata.clone(),
        );

        debug!(
            entries = result.breakdowns.len(),
            total_denominations = %result.total_denominations,
            "Breakdown calculated"
        );

        Ok(result)
    }

    /// Denominations in the order the greedy pass should consider them.
    ///
    /// Only `MinimizeLarge` differs (ascending). `MinimizeSmall`,
    /// `Balanced`, `Constrained` and `AiSuggested` currently order exactly
    /// like `Greedy`.
    pub fn denominations_for_mode(config: &CurrencyConfig, mode: OptimizationMode) -> Vec<Decimal> {
        let mut order = config.all_denominations().to_vec();
        if mode == OptimizationMode::MinimizeLarge {
            order.reverse();
        }
        order
    }

    /// Recompute the request under up to `count` other modes.
    ///
    /// Each alternative's metadata records the original mode under
    /// `alternative_to` and the mode used under `generated_by`.
    #[instrument(skip(self, request), fields(currency = %request.currency))]
    pub fn generate_alternatives(
        &self,
        request: &CalculationRequest,
        count: usize,
    ) -> Result<Vec<CalculationResult>> {
        let mut alternatives = Vec::with_capacity(count);

        for mode in ALTERNATIVE_MODES
            .into_iter()
            .filter(|mode| *mode != request.optimization_mode)
            .take(count)
        {
            let mut alt_request = request.clone().with_mode(mode);
            alt_request.metadata.clear();
            alt_request.metadata.insert(
                "alternative_to".into(),
                request.optimization_mode.as_str().into(),
            );
            alt_request
                .metadata
                .insert("generated_by".into(), mode.as_str().into());

            alternatives.push(self.calculate(&alt_request)?);
        }

        info!(alternatives = alternatives.len(), "Generated alternatives");
        Ok(alternatives)
    }

    /// Check that an amount is positive and a multiple of the smallest unit.
    pub fn validate_amount(&self, amount: Decimal, currency: &CurrencyCode) -> Result<()> {
        let config = self.currency_config(currency)?;

        if amount <= Decimal::ZERO {
            return Err(DenominaError::invalid_amount("amount must be positive"));
        }

        let remainder = amount.checked_rem(config.smallest_unit).ok_or_else(|| {
            DenominaError::Overflow(format!("{amount} mod {}", config.smallest_unit))
        })?;
        if !remainder.is_zero() {
            return Err(DenominaError::invalid_amount(format!(
                "amount must be a multiple of {}",
                config.smallest_unit
            )));
        }

        Ok(())
    }

    /// Details about an active currency.
    pub fn currency_info(&self, code: &CurrencyCode) -> Result<CurrencyInfo> {
        self.currency_config(code).map(CurrencyInfo::from)
    }

    /// Active currency codes, sorted.
    pub fn supported_currencies(&self) -> Vec<String> {
        self.registry.supported_codes()
    }
}
