use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tether_core::cache::{MappingCache, Result};
use tether_core::{ShortCode, UrlMapping};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// Configuration for [`MokaMappingCache`].
#[derive(Debug, Clone, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 10_000)]
    pub max_capacity: u64,
    /// Time-to-live for cache entries. Bounds how long a missed
    /// invalidation can serve stale data.
    #[builder(default = Duration::from_secs(5))]
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// An in-memory mapping cache using Moka.
///
/// Misses are cached too (as `None`) when filled through
/// [`get_or_compute`](MappingCache::get_or_compute), so a burst of lookups
/// for an unknown code reaches the store once per TTL.
#[derive(Debug, Clone)]
pub struct MokaMappingCache {
    cache: Cache<String, Option<UrlMapping>>,
}

impl MokaMappingCache {
    pub fn new(settings: &CacheSettings) -> Self {
        Self::with_ttl(settings.max_capacity, settings.ttl)
    }

    /// Creates a cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

impl Default for MokaMappingCache {
    fn default() -> Self {
        Self::new(&CacheSettings::default())
    }
}

#[async_trait]
impl MappingCache for MokaMappingCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        match self.cache.get(code.as_str()).await.flatten() {
            Some(mapping) => {
                debug!(code = %code, "cache hit");
                Ok(Some(mapping))
            }
            None => {
                trace!(code = %code, "cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()> {
        self.cache
            .insert(code.as_str().to_string(), Some(mapping.clone()))
            .await;
        trace!(code = %code, "cached mapping");
        Ok(())
    }

    async fn invalidate(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(code.as_str()).await;
        trace!(code = %code, "invalidated mapping");
        Ok(())
    }

    async fn get_or_compute<F, Fut>(&self, code: &ShortCode, fetch: F) -> Result<Option<UrlMapping>>
    where
        F: FnOnce(&ShortCode) -> Fut + Send,
        Fut: Future<Output = Result<Option<UrlMapping>>> + Send,
    {
        // try_get_with coalesces concurrent misses for one key into a single fetch
        self.cache
            .try_get_with(code.as_str().to_string(), async {
                trace!(code = %code, "cache miss, fetching");
                fetch(code).await
            })
            .await
            .map_err(|e| e.as_ref().clone())
    }
}
