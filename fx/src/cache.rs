//! FX rate caching with TTL support.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::rate::{CurrencyPair, FxRate};

#[derive(Debug, Clone)]
struct CacheEntry {
    rate: FxRate,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn new(rate: FxRate, ttl: Duration) -> Self {
        Self {
            rate,
            cached_at: Utc::now(),
            ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Utc::now().signed_duration_since(self.cached_at) < self.ttl
    }
}

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// TTL for cached rates.
    pub default_ttl: Duration,
    /// Entry count that triggers eviction of expired entries.
    pub max_entries: usize,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::hours(1),
            max_entries: 1024,
        }
    }
}

/// Thread-safe rate cache with TTL.
pub struct RateCache {
    cache: DashMap<CurrencyPair, CacheEntry>,
    config: RateCacheConfig,
}

impl RateCache {
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            cache: DashMap::new(),
            config,
        }
    }

    /// Get a rate from cache if still within its TTL.
    pub fn get(&self, pair: &CurrencyPair) -> Option<FxRate> {
        if let Some(entry) = self.cache.get(pair) {
            if entry.is_valid() {
                debug!(pair = %pair, "Cache hit");
                return Some(entry.rate.clone());
            }
            debug!(pair = %pair, "Cache entry expired");
            drop(entry);
            self.cache.remove(pair);
        }

        debug!(pair = %pair, "Cache miss");
        None
    }

    /// Insert a rate with the default TTL.
    pub fn insert(&self, rate: FxRate) {
        self.insert_with_ttl(rate, self.config.default_ttl);
    }

    pub fn insert_with_ttl(&self, rate: FxRate, ttl: Duration) {
        if self.cache.len() >= self.config.max_entries {
            self.evict_expired();
        }
        self.cache.insert(rate.pair.clone(), CacheEntry::new(rate, ttl));
    }

    pub fn remove(&self, pair: &CurrencyPair) {
        self.cache.remove(pair);
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn evict_expired(&self) {
        self.cache.retain(|_, entry| entry.is_valid());
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.cache.len();
        let valid = self.cache.iter().filter(|e| e.is_valid()).count();

        CacheStats {
            total_entries: total,
            valid_entries: valid,
            expired_entries: total - valid,
        }
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use denomina_common::CurrencyCode;
    use rust_decimal_macros::dec;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn make_rate(from: &str, to: &str) -> FxRate {
        FxRate::new(
            CurrencyPair::new(
                CurrencyCode::parse(from).unwrap(),
                CurrencyCode::parse(to).unwrap(),
            ),
            dec!(0.92),
            "TEST",
        )
    }

    #[test]
    fn test_cache_insert_and_get() {
        let cache = RateCache::new();
        let rate = make_rate("USD", "EUR");
        let pair = rate.pair.clone();

        cache.insert(rate.clone());

        let cached = cache.get(&pair).unwrap();
        assert_eq!(cached, rate);
        assert!(cache.get(&pair.inverse()).is_none());
    }

    #[test]
    fn test_cache_expiry() {
        let cache = RateCache::with_config(RateCacheConfig {
            default_ttl: Duration::milliseconds(50),
            ..Default::default()
        });
        let rate = make_rate("USD", "EUR");
        let pair = rate.pair.clone();

        cache.insert(rate);
        assert!(cache.get(&pair).is_some());

        sleep(StdDuration::from_millis(60));

        assert!(cache.get(&pair).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_stats_count_expired() {
        let cache = RateCache::new();
        cache.insert(make_rate("USD", "EUR"));
        cache.insert_with_ttl(make_rate("USD", "GBP"), Duration::zero());

        assert_eq!(
            cache.stats(),
            CacheStats {
                total_entries: 2,
                valid_entries: 1,
                expired_entries: 1,
            }
        );

        cache.evict_expired();
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
