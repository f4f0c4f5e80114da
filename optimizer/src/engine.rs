//! Optimization engine over denomination breakdowns.

use denomina_common::{
    CalculationRequest, CalculationResult, Constraint, CurrencyCode, DenominaError,
    OptimizationMode, Result,
};
use denomina_engine::DenominationEngine;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::constraints::{apply_constraint, into_descending, to_map};

const MINIMIZE_LARGE_EXPLANATION: &str =
    "Prefers smaller denominations to minimize large notes";
const BALANCED_EXPLANATION: &str = "Balanced distribution between large and small denominations";
const NOTES_ONLY_EXPLANATION: &str = "Uses only notes, avoiding coins";

/// Applies constraints to breakdowns and suggests alternatives.
#[derive(Debug, Clone)]
pub struct OptimizationEngine {
    engine: DenominationEngine,
}

impl OptimizationEngine {
    pub fn new(engine: DenominationEngine) -> Self {
        Self { engine }
    }

    /// The wrapped denomination engine.
    pub fn engine(&self) -> &DenominationEngine {
        &self.engine
    }

    /// Break the request down, then apply its constraints in order.
    #[instrument(skip(self, request), fields(
        currency = %request.currency,
        constraints = request.constraints.len()
    ))]
    pub fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResult> {
        let result = self.engine.calculate(request)?;
        self.apply_constraints(result, &request.constraints)
    }

    /// Rewrite a result under `constraints`, applied in list order.
    ///
    /// Returns the result unchanged when `constraints` is empty. Otherwise
    /// totals are recomputed, the mode becomes `Constrained`, and any value
    /// no longer covered by the breakdown is recorded in the metadata as
    /// `unallocated_amount`.
    #[instrument(skip(self, result, constraints), fields(
        currency = %result.currency,
        constraints = constraints.len()
    ))]
    pub fn apply_constraints(
        &self,
        result: CalculationResult,
        constraints: &[Constraint],
    ) -> Result<CalculationResult> {
        if constraints.is_empty() {
            return Ok(result);
        }

        let config = self.engine.currency_config(&result.currency)?;

        let CalculationResult {
            original_amount,
            currency,
            breakdowns,
            source_currency,
            exchange_rate,
            converted_amount,
            explanation,
            alternatives,
            metadata,
            ..
        } = result;

        let map = constraints
            .iter()
            .try_fold(to_map(breakdowns), |map, constraint| {
                apply_constraint(map, constraint, config)
            })?;

        let mut constrained = CalculationResult::from_breakdowns(
            original_amount,
            currency,
            into_descending(map),
            OptimizationMode::Constrained,
            constraints.to_vec(),
            metadata,
        );
        constrained.source_currency = source_currency;
        constrained.exchange_rate = exchange_rate;
        constrained.converted_amount = converted_amount;
        constrained.explanation = explanation;
        constrained.alternatives = alternatives;

        let shortfall = constrained.shortfall();
        if shortfall > Decimal::ZERO {
            warn!(
                shortfall = %shortfall,
                "Constrained breakdown does not cover the full amount"
            );
            constrained.metadata.insert(
                "unallocated_amount".into(),
                shortfall.normalize().to_string().into(),
            );
        }

        Ok(constrained)
    }

    /// Up to `count` labeled alternatives for a request.
    ///
    /// In order: smallest-first, balanced, and notes only. The notes-only
    /// variant is skipped when the currency lacks either notes or coins, or
    /// when no note fits the amount.
    #[instrument(skip(self, request), fields(currency = %request.currency))]
    pub fn suggest_alternatives(
        &self,
        request: &CalculationRequest,
        count: usize,
    ) -> Result<Vec<CalculationResult>> {
        let config = self.engine.currency_config(&request.currency)?;
        let strategy_request = |mode: OptimizationMode, strategy: &str| -> Result<CalculationRequest> {
            Ok(CalculationRequest::new(request.amount, request.currency.clone())?
                .with_mode(mode)
                .with_metadata("strategy", strategy.into()))
        };

        let mut alternatives = Vec::with_capacity(3);

        let minimize_large = self.engine.calculate(&strategy_request(
            OptimizationMode::MinimizeLarge,
            "minimize_large_notes",
        )?)?;
        alternatives.push(explained(minimize_large, MINIMIZE_LARGE_EXPLANATION));

        let balanced = self
            .engine
            .calculate(&strategy_request(OptimizationMode::Balanced, "balanced")?)?;
        alternatives.push(explained(balanced, BALANCED_EXPLANATION));

        if config.coins().is_empty() || config.notes().is_empty() {
            debug!("Skipping notes-only alternative");
        } else {
            let notes_only = [Constraint::Only {
                denominations: config.notes().to_vec(),
            }];
            let outcome = strategy_request(OptimizationMode::Greedy, "notes_only")
                .and_then(|req| self.engine.calculate(&req))
                .and_then(|result| self.apply_constraints(result, &notes_only));

            match outcome {
                Ok(result) if !result.breakdowns.is_empty() => {
                    alternatives.push(explained(result, NOTES_ONLY_EXPLANATION));
                }
                Ok(_) => debug!("Notes-only alternative is empty, skipping"),
                Err(e) => debug!(error = %e, "Notes-only alternative failed, skipping"),
            }
        }

        alternatives.truncate(count);
        info!(alternatives = alternatives.len(), "Suggested alternatives");
        Ok(alternatives)
    }

    /// Check that every constraint is applicable to the currency.
    pub fn validate_constraints(
        &self,
        constraints: &[Constraint],
        currency: &CurrencyCode,
    ) -> Result<()> {
        let config = self.engine.currency_config(currency)?;
        let unavailable = |d: Decimal| {
            DenominaError::ConstraintError(format!(
                "denomination {d} not available in {currency}"
            ))
        };

        for constraint in constraints {
            if let Some(d) = constraint.denomination() {
                if !config.has_denomination(d) {
                    return Err(unavailable(d));
                }
            }

            match constraint {
                Constraint::Cap { value, .. } | Constraint::Require { value, .. } if *value < 0 => {
                    return Err(DenominaError::ConstraintError(format!(
                        "invalid value {value} for {} constraint",
                        constraint.kind()
                    )));
                }
                Constraint::Only { denominations } => {
                    if denominations.is_empty() {
                        return Err(DenominaError::ConstraintError(
                            "only constraint requires a list of denominations".into(),
                        ));
                    }
                    if let Some(d) = denominations.iter().find(|d| !config.has_denomination(**d)) {
                        return Err(unavailable(*d));
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }
}

fn explained(mut result: CalculationResult, explanation: &str) -> CalculationResult {
    result
        .metadata
        .insert("explanation".into(), explanation.into());
    result.explanation = Some(explanation.to_string());
    result
}
