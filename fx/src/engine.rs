//! Main FX engine implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use denomina_common::CurrencyCode;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::cache::{CacheStats, RateCache, RateCacheConfig};
use crate::conversion::Conversion;
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::rate::{CurrencyPair, FxRate};

/// Configuration for the FX engine.
#[derive(Debug, Clone)]
pub struct FxEngineConfig {
    pub cache: RateCacheConfig,
    /// Whether to use cached rates.
    pub use_cache: bool,
}

impl Default for FxEngineConfig {
    fn default() -> Self {
        Self {
            cache: RateCacheConfig::default(),
            use_cache: true,
        }
    }
}

/// The main FX engine.
pub struct FxEngine {
    provider: Arc<dyn RateProvider>,
    cache: RateCache,
    config: FxEngineConfig,
}

impl FxEngine {
    pub fn new(provider: Arc<dyn RateProvider>, config: FxEngineConfig) -> Self {
        Self {
            provider,
            cache: RateCache::with_config(config.cache.clone()),
            config,
        }
    }

    /// Get the current rate for a currency pair.
    ///
    /// A currency into itself is always rate 1 and never reaches the provider.
    #[instrument(skip(self, pair), fields(pair = %pair))]
    pub async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<FxRate> {
        if pair.is_identity() {
            return Ok(FxRate::identity(pair.from.clone()));
        }

        if self.config.use_cache {
            if let Some(cached) = self.cache.get(pair) {
                debug!("Using cached rate");
                return Ok(cached);
            }
        }

        let rate = self.provider.get_rate(pair).await?;
        if rate.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                pair: pair.clone(),
                rate: rate.rate,
            });
        }

        if self.config.use_cache {
            self.cache.insert(rate.clone());
        }

        Ok(rate)
    }

    /// Convert an amount from one currency to another.
    #[instrument(skip_all, fields(from = %from, to = %to, amount = %amount))]
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> FxResult<Conversion> {
        let pair = CurrencyPair::new(from.clone(), to.clone());
        let rate = self.get_rate(&pair).await?;
        let conversion = Conversion::at_rate(amount, &rate)?;

        info!(
            conversion_id = %conversion.id,
            rate = %conversion.rate,
            output = %conversion.output,
            source = %conversion.source,
            "Conversion completed"
        );

        Ok(conversion)
    }

    /// Rates from `base` into each of `targets`.
    ///
    /// The base itself and any pair the provider cannot quote are left out.
    #[instrument(skip_all, fields(base = %base, targets = targets.len()))]
    pub async fn rates_for(
        &self,
        base: &CurrencyCode,
        targets: &[CurrencyCode],
    ) -> BTreeMap<CurrencyCode, FxRate> {
        let mut rates = BTreeMap::new();

        for target in targets.iter().filter(|target| *target != base) {
            let pair = CurrencyPair::new(base.clone(), target.clone());
            match self.get_rate(&pair).await {
                Ok(rate) => {
                    rates.insert(target.clone(), rate);
                }
                Err(e) => warn!(pair = %pair, error = %e, "Skipping unavailable rate"),
            }
        }

        debug!(quoted = rates.len(), "Collected rate table");
        rates
    }

    pub fn supports_pair(&self, pair: &CurrencyPair) -> bool {
        pair.is_identity() || self.provider.supports_pair(pair)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop expired cache entries.
    pub fn cleanup(&self) {
        self.cache.evict_expired();
    }
}
