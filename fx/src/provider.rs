//! Rate provider trait and implementations.

use async_trait::async_trait;
use dashmap::DashMap;
use denomina_common::CurrencyCode;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};
use crate::rate::{CurrencyPair, FxRate};

/// Trait for FX rate providers.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Get rate for a currency pair.
    async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<FxRate>;

    /// Check if this provider supports the given currency pair.
    fn supports_pair(&self, pair: &CurrencyPair) -> bool;
}

/// Fixed rates quoted against a single base currency.
///
/// Cross rates go through the base: `from -> to` is `rate(to) / rate(from)`.
pub struct StaticRateProvider {
    base: CurrencyCode,
    rates: DashMap<CurrencyCode, Decimal>,
}

impl StaticRateProvider {
    /// Provider with only the base currency at rate 1.
    pub fn new(base: CurrencyCode) -> Self {
        let rates = DashMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    /// USD-based reference rates for offline use.
    pub fn reference() -> Self {
        let provider = Self::new(CurrencyCode::usd());
        provider.set_rate(CurrencyCode::eur(), Decimal::new(92, 2));
        provider.set_rate(CurrencyCode::gbp(), Decimal::new(79, 2));
        provider.set_rate(CurrencyCode::inr(), Decimal::new(8312, 2));
        provider
    }

    /// Units of `currency` per one unit of the base.
    pub fn set_rate(&self, currency: CurrencyCode, units_per_base: Decimal) {
        self.rates.insert(currency, units_per_base);
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    fn base_rate(&self, pair: &CurrencyPair, currency: &CurrencyCode) -> FxResult<Decimal> {
        let rate = self
            .rates
            .get(currency)
            .map(|r| *r)
            .ok_or_else(|| FxError::RateNotAvailable(pair.clone()))?;
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                pair: CurrencyPair::new(self.base.clone(), currency.clone()),
                rate,
            });
        }
        Ok(rate)
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<FxRate> {
        let from = self.base_rate(pair, &pair.from)?;
        let to = self.base_rate(pair, &pair.to)?;
        let rate = to
            .checked_div(from)
            .ok_or_else(|| FxError::InvalidRate {
                pair: pair.clone(),
                rate: Decimal::ZERO,
            })?
            .normalize();

        Ok(FxRate::new(pair.clone(), rate, self.name()))
    }

    fn supports_pair(&self, pair: &CurrencyPair) -> bool {
        self.rates.contains_key(&pair.from) && self.rates.contains_key(&pair.to)
    }
}

/// Tries providers in order and returns the first rate quoted.
pub struct FallbackRateProvider {
    providers: Vec<Arc<dyn RateProvider>>,
}

impl FallbackRateProvider {
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl RateProvider for FallbackRateProvider {
    fn name(&self) -> &str {
        "FALLBACK"
    }

    async fn get_rate(&self, pair: &CurrencyPair) -> FxResult<FxRate> {
        for provider in &self.providers {
            if !provider.supports_pair(pair) {
                continue;
            }

            match provider.get_rate(pair).await {
                Ok(rate) => {
                    debug!(
                        provider = provider.name(),
                        pair = %pair,
                        rate = %rate.rate,
                        "Got rate from provider"
                    );
                    return Ok(rate);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        pair = %pair,
                        error = %e,
                        "Provider failed to return rate"
                    );
                }
            }
        }

        Err(FxError::RateNotAvailable(pair.clone()))
    }

    fn supports_pair(&self, pair: &CurrencyPair) -> bool {
        self.providers.iter().any(|p| p.supports_pair(pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn pair(from: &str, to: &str) -> CurrencyPair {
        CurrencyPair::new(code(from), code(to))
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        fn name(&self) -> &str {
            "FAILING"
        }

        async fn get_rate(&self, _pair: &CurrencyPair) -> FxResult<FxRate> {
            Err(FxError::ProviderError("connection refused".into()))
        }

        fn supports_pair(&self, _pair: &CurrencyPair) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_reference_rates() {
        let provider = StaticRateProvider::reference();

        let rate = provider.get_rate(&pair("USD", "INR")).await.unwrap();
        assert_eq!(rate.rate, dec!(83.12));
        assert_eq!(rate.source, "STATIC");

        let rate = provider.get_rate(&pair("EUR", "USD")).await.unwrap();
        assert_eq!(rate.rate, dec!(1) / dec!(0.92));
    }

    #[tokio::test]
    async fn test_cross_rate_through_base() {
        let provider = StaticRateProvider::reference();
        let rate = provider.get_rate(&pair("GBP", "EUR")).await.unwrap();
        assert_eq!(rate.rate, (dec!(0.92) / dec!(0.79)).normalize());
    }

    #[test]
    fn test_unknown_currency() {
        let provider = StaticRateProvider::reference();
        let result = tokio_test::block_on(provider.get_rate(&pair("USD", "JPY")));

        assert!(matches!(result, Err(FxError::RateNotAvailable(_))));
        assert!(!provider.supports_pair(&pair("USD", "JPY")));
        assert!(provider.supports_pair(&pair("INR", "GBP")));
    }

    #[tokio::test]
    async fn test_invalid_rate() {
        let provider = StaticRateProvider::new(code("USD"));
        provider.set_rate(code("XTS"), Decimal::ZERO);

        let result = provider.get_rate(&pair("USD", "XTS")).await;
        assert!(matches!(result, Err(FxError::InvalidRate { .. })));
    }

    #[tokio::test]
    async fn test_fallback_skips_failing_provider() {
        let fallback = FallbackRateProvider::new(vec![
            Arc::new(FailingProvider),
            Arc::new(StaticRateProvider::reference()),
        ]);

        let rate = fallback.get_rate(&pair("USD", "EUR")).await.unwrap();
        assert_eq!(rate.rate, dec!(0.92));
        assert_eq!(rate.source, "STATIC");
    }

    #[tokio::test]
    async fn test_fallback_exhausted() {
        let fallback = FallbackRateProvider::new(vec![Arc::new(FailingProvider)]);
        let result = fallback.get_rate(&pair("USD", "EUR")).await;
        assert!(matches!(result, Err(FxError::RateNotAvailable(_))));
    }
}
