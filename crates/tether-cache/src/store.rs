use async_trait::async_trait;
use tether_core::error::{Result, StoreError};
use tether_core::{CacheError, MappingCache, MappingStore, ReadStore, ShortCode, TargetUrl, UrlMapping};
use tracing::{trace, warn};

/// A store decorator that serves reads through a [`MappingCache`].
///
/// Reads check the cache first and fall back to the inner store, with
/// concurrent misses for one code coalesced where the cache supports it.
/// Every write goes straight to the inner store and then invalidates the
/// code, whether the write succeeded or not, so the next read sees the
/// committed state. The cache TTL bounds staleness if an invalidation is
/// lost.
#[derive(Debug, Clone)]
pub struct CachedStore<S, C> {
    inner: S,
    cache: C,
}

impl<S, C: MappingCache> CachedStore<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self { inner, cache }
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Drops the cached entry for `code`. Failures are logged, not returned:
    /// the write they follow has already reached the store.
    async fn invalidate(&self, code: &ShortCode) {
        trace!(code = %code, "invalidating cache entry");
        if let Err(e) = self.cache.invalidate(code).await {
            warn!(code = %code, error = %e, "failed to invalidate cache entry");
        }
    }
}

#[async_trait]
impl<S: ReadStore, C: MappingCache> ReadStore for CachedStore<S, C> {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        let cached = self
            .cache
            .get_or_compute(code, |c| {
                let code = c.clone();
                async move {
                    match self.inner.get_by_code(&code).await {
                        Ok(mapping) => Ok(Some(mapping)),
                        Err(StoreError::NotFound(_)) => Ok(None),
                        Err(e) => Err(CacheError::Store(Box::new(e))),
                    }
                }
            })
            .await?;

        cached.ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        self.inner.max_id().await
    }
}

#[async_trait]
impl<S: MappingStore, C: MappingCache> MappingStore for CachedStore<S, C> {
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping> {
        let result = self.inner.insert(code, target_url).await;
        // a cached miss for this code would hide the new row until it expired
        self.invalidate(code).await;
        result
    }

    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping> {
        let result = self.inner.update(code, target_url, expected_version).await;
        self.invalidate(code).await;
        result
    }

    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        let result = self.inner.soft_delete(code, expected_version).await;
        self.invalidate(code).await;
        result
    }
}
