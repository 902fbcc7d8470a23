//! Caching layer for geocoding lookups.
//!
//! Itineraries are edited and re-submitted many times, so the same handful
//! of addresses is geocoded over and over. Successful lookups are cached
//! per provider; failures are not, so a transient outage does not pin a
//! stop to "no coordinates" for the whole TTL.

use std::time::Duration;

use futures::FutureExt;
use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::Coordinate;

use super::{GeocodeProvider, ProviderFuture};

/// Configuration for the geocode cache.
#[derive(Debug, Clone)]
pub struct GeocodeCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for GeocodeCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

/// Address → coordinate cache. Clones share the same entries.
#[derive(Clone)]
pub struct GeocodeCache {
    entries: MokaCache<String, Coordinate>,
}

impl GeocodeCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &GeocodeCacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    /// Cache key: whitespace-collapsed, lower-cased address.
    fn key(address: &str) -> String {
        address
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Get a cached coordinate.
    pub async fn get(&self, address: &str) -> Option<Coordinate> {
        self.entries.get(&Self::key(address)).await
    }

    /// Insert a coordinate into the cache.
    pub async fn insert(&self, address: &str, coordinate: Coordinate) {
        self.entries.insert(Self::key(address), coordinate).await;
    }

}

/// A geocoder with caching.
///
/// Wraps any `GeocodeProvider` and memoises its successful answers.
pub struct CachedGeocodeProvider<P> {
    inner: P,
    cache: GeocodeCache,
}

impl<P: GeocodeProvider> CachedGeocodeProvider<P> {
    /// Create a new cached provider around `inner`.
    pub fn new(inner: P, cache: GeocodeCache) -> Self {
        Self { inner, cache }
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: GeocodeProvider> GeocodeProvider for CachedGeocodeProvider<P> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn geocode<'a>(&'a self, address: &'a str) -> ProviderFuture<'a, Coordinate> {
        async move {
            if let Some(hit) = self.cache.get(address).await {
                trace!(provider = self.inner.name(), address, "geocode cache hit");
                return Ok(hit);
            }

            let coordinate = self.inner.geocode(address).await?;
            self.cache.insert(address, coordinate).await;
            Ok(coordinate)
        }
        .boxed()
    }
}
