//! Denomina FX
//!
//! Exchange rate lookup and conversion for breakdowns requested in one
//! currency and paid out in another.
//!
//! # Features
//!
//! - Pluggable rate providers with ordered fallback
//! - Static reference rates with cross rates through a base currency
//! - Rate caching with configurable TTL
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use denomina_common::CurrencyCode;
//! use denomina_fx::{FxEngine, FxEngineConfig, StaticRateProvider};
//!
//! let engine = FxEngine::new(Arc::new(StaticRateProvider::reference()), FxEngineConfig::default());
//!
//! let usd = CurrencyCode::parse("USD")?;
//! let inr = CurrencyCode::parse("INR")?;
//! let conversion = engine.convert(dec!(100), &usd, &inr).await?;
//! assert_eq!(conversion.output, dec!(8312));
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod rate;

pub use cache::{CacheStats, RateCache, RateCacheConfig};
pub use conversion::Conversion;
pub use engine::{FxEngine, FxEngineConfig};
pub use error::{FxError, FxResult};
pub use provider::{FallbackRateProvider, RateProvider, StaticRateProvider};
pub use rate::{CurrencyPair, FxRate};
