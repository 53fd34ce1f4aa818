// src/market_data/cache.rs
//! Fingerprint cache for historical price fetches
//!
//! Entries are keyed by `(ticker, start, end)`. Each key owns a slot mutex, so
//! concurrent callers for the same key wait for one in-flight fetch instead of
//! issuing their own. Failed fetches release their slot. Entries older than
//! the configured time-to-live are refetched on the next request.

use super::provider::{HistoricalPriceProvider, PriceHistory};
use crate::error::SimResult;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PriceKey {
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            start,
            end,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// `None` keeps entries for the life of the cache
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

struct CacheEntry {
    history: Arc<PriceHistory>,
    fetched_at: Instant,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wraps a provider with at-most-one-fetch-per-key semantics.
pub struct CachedProvider<P> {
    inner: P,
    config: CacheConfig,
    slots: Mutex<HashMap<PriceKey, Slot>>,
}

impl<P: HistoricalPriceProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_config(inner, CacheConfig::default())
    }

    pub fn with_config(inner: P, config: CacheConfig) -> Self {
        Self {
            inner,
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Fetch through the cache, sharing the stored history.
    pub fn fetch_shared(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> SimResult<Arc<PriceHistory>> {
        let key = PriceKey::new(ticker, start, end);
        let slot = Arc::clone(lock(&self.slots).entry(key.clone()).or_default());

        let mut entry = lock(&slot);
        if let Some(cached) = entry.as_ref() {
            if !self.is_expired(cached) {
                trace!(ticker = %key.ticker, %start, %end, "price cache hit");
                return Ok(Arc::clone(&cached.history));
            }
            debug!(ticker = %key.ticker, %start, %end, "price cache entry expired");
        }

        debug!(ticker = %key.ticker, %start, %end, "price cache miss, fetching");
        let history = match self.inner.fetch(ticker, start, end) {
            Ok(history) => Arc::new(history),
            Err(e) => {
                drop(entry);
                self.release_vacant_slot(&key, &slot);
                return Err(e);
            }
        };
        *entry = Some(CacheEntry {
            history: Arc::clone(&history),
            fetched_at: Instant::now(),
        });
        Ok(history)
    }

    /// Drop one entry; returns whether it was cached.
    pub fn invalidate(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> bool {
        let key = PriceKey::new(ticker, start, end);
        let removed = lock(&self.slots).remove(&key);
        match removed {
            Some(slot) => {
                let was_fetched = lock(&slot).is_some();
                was_fetched
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        lock(&self.slots).clear();
    }

    /// Drop every expired entry.
    pub fn evict_expired(&self) -> usize {
        let mut slots = lock(&self.slots);
        let before = slots.len();
        slots.retain(|_, slot| match lock(slot).as_ref() {
            Some(entry) => !self.is_expired(entry),
            None => false,
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired price cache entries");
        }
        evicted
    }

    /// Number of keys holding a fetched history
    pub fn len(&self) -> usize {
        let slots = lock(&self.slots);
        slots.values().filter(|slot| lock(slot).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove `slot` from the map if it is still the registered one and nobody has filled it.
    fn release_vacant_slot(&self, key: &PriceKey, slot: &Slot) {
        let mut slots = lock(&self.slots);
        let vacant = slots.get(key).map_or(false, |current| {
            Arc::ptr_eq(current, slot) && matches!(current.try_lock(), Ok(guard) if guard.is_none())
        });
        if vacant {
            slots.remove(key);
            trace!(ticker = %key.ticker, "released slot after failed fetch");
        }
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.config
            .ttl
            .map_or(false, |ttl| entry.fetched_at.elapsed() >= ttl)
    }
}

impl<P: HistoricalPriceProvider> HistoricalPriceProvider for CachedProvider<P> {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> SimResult<PriceHistory> {
        self.fetch_shared(ticker, start, end)
            .map(|history| (*history).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::market_data::provider::PricePoint;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl HistoricalPriceProvider for CountingProvider {
        fn fetch(&self, ticker: &str, start: NaiveDate, _end: NaiveDate) -> SimResult<PriceHistory> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SimError::HistoricalData {
                    ticker: ticker.to_string(),
                    reason: "provider offline".to_string(),
                });
            }
            PriceHistory::new(ticker, vec![PricePoint::new(start, 50.0)])
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_one_fetch_per_key() {
        let cache = CachedProvider::new(CountingProvider::new(false));
        let a = cache.fetch_shared("AAPL", day(1), day(10)).unwrap();
        let b = cache.fetch_shared("aapl", day(1), day(10)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);

        cache.fetch_shared("AAPL", day(2), day(10)).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let cache = CachedProvider::new(CountingProvider::new(true));
        assert!(cache.fetch_shared("AAPL", day(1), day(10)).is_err());
        assert!(cache.fetch_shared("AAPL", day(1), day(10)).is_err());
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failed_fetches_do_not_accumulate_slots() {
        let cache = CachedProvider::new(CountingProvider::new(true));
        for d in 1..=20 {
            assert!(cache.fetch_shared("BOGUS", day(d), day(28)).is_err());
        }
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 20);
        assert!(lock(&cache.slots).is_empty());
    }

    #[test]
    fn test_ttl_and_invalidation() {
        let cache = CachedProvider::with_config(
            CountingProvider::new(false),
            CacheConfig::with_ttl(Duration::ZERO),
        );
        cache.fetch_shared("AAPL", day(1), day(10)).unwrap();
        cache.fetch_shared("AAPL", day(1), day(10)).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.evict_expired(), 1);
        assert!(cache.is_empty());

        let forever = CachedProvider::new(CountingProvider::new(false));
        forever.fetch_shared("MSFT", day(1), day(10)).unwrap();
        assert!(forever.invalidate("MSFT", day(1), day(10)));
        assert!(!forever.invalidate("MSFT", day(1), day(10)));
        forever.fetch_shared("MSFT", day(1), day(10)).unwrap();
        assert_eq!(forever.inner().calls.load(Ordering::SeqCst), 2);
        forever.clear();
        assert!(forever.is_empty());
    }
}
