//! Row-level batch processing for bulk ingestion.
//!
//! Each row is resolved independently; a bad row is reported in its outcome
//! and never aborts the rest of the batch.

use std::str::FromStr;
use std::time::Instant;

use denomina_common::{
    CalculationRequest, CalculationResult, CurrencyCode, DenominaError, OptimizationMode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::calculator::Calculator;
use crate::error::{ServiceError, ServiceResult};

/// Modes a batch row may request.
const BATCH_MODES: [OptimizationMode; 4] = [
    OptimizationMode::Greedy,
    OptimizationMode::Balanced,
    OptimizationMode::MinimizeLarge,
    OptimizationMode::MinimizeSmall,
];

/// One unparsed input row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRow {
    /// Position in the source file. Defaults to the 1-based index.
    #[serde(default)]
    pub row_number: Option<usize>,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub optimization_mode: String,
}

impl BatchRow {
    pub fn new(amount: &str, currency: &str, optimization_mode: &str) -> Self {
        Self {
            row_number: None,
            amount: amount.to_string(),
            currency: currency.to_string(),
            optimization_mode: optimization_mode.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Success,
    Error,
}

/// Result of processing one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_number: usize,
    pub status: RowStatus,
    /// Amount as given, or as parsed on success.
    pub amount: String,
    pub currency: String,
    pub optimization_mode: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<CalculationResult>,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<RowOutcome>,
    pub processing_time_ms: u64,
}

/// A row resolved into a request.
struct ParsedRow {
    request: CalculationRequest,
    warnings: Vec<String>,
}

/// Parse an amount string: spaces and thousands separators are dropped and
/// scientific notation is read exactly.
pub fn parse_amount(raw: &str) -> ServiceResult<Decimal> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
    if cleaned.is_empty() {
        return Err(DenominaError::invalid_amount("amount is required").into());
    }

    let parsed = if cleaned.contains(['e', 'E']) {
        Decimal::from_scientific(&cleaned)
    } else {
        Decimal::from_str(&cleaned)
    };

    let amount = parsed.map_err(|e| {
        DenominaError::invalid_amount(format!("{raw:?}: {e}"))
    })?;
    if amount <= Decimal::ZERO {
        return Err(DenominaError::invalid_amount(format!(
            "amount must be positive, got {raw:?}"
        ))
        .into());
    }
    Ok(amount)
}

/// Resolve a batch mode string, defaulting to greedy.
///
/// Returns the mode and a warning when the input had to be replaced.
pub fn resolve_mode(raw: &str) -> (OptimizationMode, Option<String>) {
    if raw.trim().is_empty() {
        return (OptimizationMode::Greedy, None);
    }

    match OptimizationMode::from_str(raw) {
        Ok(mode) if BATCH_MODES.contains(&mode) => (mode, None),
        _ => (
            OptimizationMode::Greedy,
            Some(format!("invalid optimization mode {raw:?}, using greedy")),
        ),
    }
}

impl Calculator {
    /// Process rows independently and summarize the batch.
    ///
    /// Fails up front only when the batch exceeds the configured row limit.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn process_rows(&self, rows: &[BatchRow]) -> ServiceResult<BatchSummary> {
        let max = self.config().max_batch_rows;
        if rows.len() > max {
            return Err(ServiceError::BatchTooLarge {
                rows: rows.len(),
                max,
            });
        }

        let started = Instant::now();
        let mut results = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            let row_number = row.row_number.unwrap_or(index + 1);
            let outcome = match self.parse_row(row, row_number) {
                Ok(parsed) => self.calculate_row(row, row_number, parsed),
                Err(e) => failure(row, row_number, Vec::new(), &e),
            };
            results.push(outcome);
        }

        let successful = results
            .iter()
            .filter(|r| r.status == RowStatus::Success)
            .count();
        let summary = BatchSummary {
            total_rows: results.len(),
            successful,
            failed: results.len() - successful,
            results,
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        info!(
            total = summary.total_rows,
            successful = summary.successful,
            failed = summary.failed,
            elapsed_ms = summary.processing_time_ms,
            "Batch complete"
        );

        Ok(summary)
    }

    fn parse_row(&self, row: &BatchRow, row_number: usize) -> ServiceResult<ParsedRow> {
        let amount = parse_amount(&row.amount)?;
        self.check_amount(amount)?;

        if row.currency.trim().is_empty() {
            return Err(DenominaError::unsupported_currency(
                "",
                "currency is required",
            )
            .into());
        }
        let currency = CurrencyCode::parse(&row.currency)?;

        let (mode, warning) = resolve_mode(&row.optimization_mode);
        let mut warnings = Vec::new();
        if let Some(warning) = warning {
            warn!(row = row_number, mode = %row.optimization_mode, "Invalid mode, using greedy");
            warnings.push(warning);
        }

        Ok(ParsedRow {
            request: CalculationRequest::new(amount, currency)?
                .with_mode(mode)
                .with_metadata("row_number", row_number.into()),
            warnings,
        })
    }

    fn calculate_row(&self, row: &BatchRow, row_number: usize, parsed: ParsedRow) -> RowOutcome {
        let ParsedRow { request, warnings } = parsed;

        match self.optimizer().calculate(&request) {
            Ok(result) => {
                debug!(
                    row = row_number,
                    total_denominations = %result.total_denominations,
                    "Row calculated"
                );
                RowOutcome {
                    row_number,
                    status: RowStatus::Success,
                    amount: request.amount.to_string(),
                    currency: request.currency.to_string(),
                    optimization_mode: request.optimization_mode.to_string(),
                    warnings,
                    error: None,
                    error_code: None,
                    result: Some(result),
                }
            }
            Err(e) => failure(row, row_number, warnings, &e.into()),
        }
    }
}

fn failure(row: &BatchRow, row_number: usize, warnings: Vec<String>, error: &ServiceError) -> RowOutcome {
    warn!(row = row_number, error = %error, "Row failed");
    RowOutcome {
        row_number,
        status: RowStatus::Error,
        amount: row.amount.clone(),
        currency: row.currency.clone(),
        optimization_mode: row.optimization_mode.clone(),
        warnings,
        error: Some(error.to_string()),
        error_code: Some(error.error_code().to_string()),
        result: None,
    }
}
