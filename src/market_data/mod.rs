//! Historical closing prices: the provider seam and its fingerprint cache.

pub mod cache;
pub mod provider;

pub use cache::{CacheConfig, CachedProvider, PriceKey};
pub use provider::{HistoricalPriceProvider, InMemoryProvider, PriceHistory, PricePoint};
