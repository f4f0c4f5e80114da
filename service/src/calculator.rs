//! Calculator service: FX conversion, breakdown and constraints in one call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use denomina_common::{CalculationRequest, CalculationResult, CurrencyCode, DenominaError};
use denomina_engine::DenominationEngine;
use denomina_fx::{FxEngine, FxEngineConfig, RateCacheConfig, RateProvider, StaticRateProvider};
use denomina_optimizer::OptimizationEngine;
use denomina_registry::CurrencyRegistry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{ServiceConfig, MAX_FX_CACHE_TTL_SECS};
use crate::error::{ServiceError, ServiceResult};

/// Exchange rates from one base currency into the supported currencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub base_currency: CurrencyCode,
    /// Units of each currency per one unit of the base.
    pub rates: BTreeMap<CurrencyCode, Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// Embedding layer around the denomination and optimization engines.
pub struct Calculator {
    optimizer: OptimizationEngine,
    fx: FxEngine,
    config: ServiceConfig,
}

impl Calculator {
    pub fn new(optimizer: OptimizationEngine, fx: FxEngine, config: ServiceConfig) -> Self {
        Self {
            optimizer,
            fx,
            config,
        }
    }

    /// Build a calculator from configuration, using the static reference
    /// FX rates.
    pub fn from_config(config: ServiceConfig) -> ServiceResult<Self> {
        Self::with_rate_provider(config, Arc::new(StaticRateProvider::reference()))
    }

    pub fn with_rate_provider(
        config: ServiceConfig,
        provider: Arc<dyn RateProvider>,
    ) -> ServiceResult<Self> {
        let registry = match &config.currency_config {
            Some(path) => CurrencyRegistry::from_path(path)?,
            None => CurrencyRegistry::builtin()?,
        };

        let engine = DenominationEngine::new(Arc::new(registry));
        let fx_config = FxEngineConfig {
            cache: RateCacheConfig {
                default_ttl: chrono::Duration::seconds(
                    config.fx_cache_ttl_secs.clamp(0, MAX_FX_CACHE_TTL_SECS),
                ),
                ..Default::default()
            },
            use_cache: config.fx_cache_ttl_secs > 0,
        };

        info!(
            currencies = engine.supported_currencies().len(),
            fx_provider = provider.name(),
            "Calculator initialized"
        );

        Ok(Self::new(
            OptimizationEngine::new(engine),
            FxEngine::new(provider, fx_config),
            config,
        ))
    }

    pub fn optimizer(&self) -> &OptimizationEngine {
        &self.optimizer
    }

    pub fn engine(&self) -> &DenominationEngine {
        self.optimizer.engine()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Reject amounts above the configured maximum.
    pub fn check_amount(&self, amount: Decimal) -> ServiceResult<()> {
        if amount > self.config.max_amount {
            return Err(ServiceError::AmountTooLarge {
                amount,
                max: self.config.max_amount,
            });
        }
        Ok(())
    }

    /// Calculate a breakdown, converting currencies first when needed, then
    /// apply the request's constraints.
    #[instrument(skip(self, request), fields(
        amount = %request.amount,
        currency = %request.currency,
        mode = %request.optimization_mode
    ))]
    pub async fn calculate(&self, request: &CalculationRequest) -> ServiceResult<CalculationResult> {
        self.check_amount(request.amount)?;

        let source = match &request.source_currency {
            Some(source) if request.needs_conversion() => source.clone(),
            _ => {
                self.optimizer
                    .validate_constraints(&request.constraints, &request.currency)?;
                return Ok(self.optimizer.calculate(request)?);
            }
        };

        let conversion = self
            .fx
            .convert(request.amount, &source, &request.currency)
            .await?;
        let target = self.engine().currency_config(&request.currency)?;
        let converted = round_down(conversion.output, target.smallest_unit)?;
        if converted.is_zero() {
            return Err(DenominaError::invalid_amount(format!(
                "{} {source} converts to {} {}, less than the smallest unit {}",
                request.amount, conversion.output, request.currency, target.smallest_unit
            ))
            .into());
        }

        debug!(
            rate = %conversion.rate,
            converted = %converted,
            unrounded = %conversion.output,
            "Converted amount"
        );

        let mut breakdown_request = request.clone();
        if request.convert_before_breakdown {
            breakdown_request.amount = converted;
        } else {
            breakdown_request.currency = source.clone();
        }
        self.optimizer
            .validate_constraints(&request.constraints, &breakdown_request.currency)?;

        let mut result = self.engine().calculate(&breakdown_request)?;
        result.original_amount = request.amount;
        let mut result = result.with_fx(source, conversion.rate, converted);

        result
            .metadata
            .insert("fx_source".into(), conversion.source.clone().into());
        result
            .metadata
            .insert("rate_timestamp".into(), conversion.quoted_at.to_rfc3339().into());
        if !request.convert_before_breakdown {
            result
                .metadata
                .insert("converted_currency".into(), request.currency.as_str().into());
        }

        Ok(self
            .optimizer
            .apply_constraints(result, &request.constraints)?)
    }

    /// Calculate and attach up to `count` alternatives.
    ///
    /// With `suggest`, alternatives are the optimizer's labeled suggestions;
    /// otherwise they are the same amount under other modes.
    pub async fn calculate_with_alternatives(
        &self,
        request: &CalculationRequest,
        count: usize,
        suggest: bool,
    ) -> ServiceResult<CalculationResult> {
        let mut result = self.calculate(request).await?;
        if count == 0 {
            return Ok(result);
        }

        let mut alt_request =
            CalculationRequest::new(result.breakdown_amount(), result.currency.clone())?
                .with_mode(request.optimization_mode);
        alt_request.metadata = request.metadata.clone();

        result.alternatives = Some(self.alternatives(&alt_request, count, suggest)?);
        Ok(result)
    }

    /// Alternatives for a request in its own currency.
    pub fn alternatives(
        &self,
        request: &CalculationRequest,
        count: usize,
        suggest: bool,
    ) -> ServiceResult<Vec<CalculationResult>> {
        self.check_amount(request.amount)?;
        let alternatives = if suggest {
            self.optimizer.suggest_alternatives(request, count)?
        } else {
            self.engine().generate_alternatives(request, count)?
        };
        Ok(alternatives)
    }

    /// Rates from `base` into every supported currency that can be quoted.
    pub async fn exchange_rates(&self, base: &CurrencyCode) -> RateTable {
        let targets: Vec<CurrencyCode> = self
            .engine()
            .supported_currencies()
            .iter()
            .filter_map(|code| CurrencyCode::parse(code).ok())
            .collect();

        let rates = self
            .fx
            .rates_for(base, &targets)
            .await
            .into_iter()
            .map(|(currency, rate)| (currency, rate.rate))
            .collect();

        RateTable {
            base_currency: base.clone(),
            rates,
            timestamp: Utc::now(),
        }
    }
}

/// Round down to a whole number of `unit`s.
fn round_down(value: Decimal, unit: Decimal) -> ServiceResult<Decimal> {
    let overflow = || DenominaError::Overflow(format!("rounding {value} to {unit}"));
    let units = value.checked_div(unit).ok_or_else(overflow)?.floor();
    Ok(units.checked_mul(unit).ok_or_else(overflow)?.normalize())
}
