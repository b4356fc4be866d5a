use crate::error::CacheError;
use crate::mapping::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::future::Future;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A read-optimized cache of [`UrlMapping`]s keyed by [`ShortCode`].
///
/// Implementations must bound staleness (for example with a TTL) so that
/// updates and deletes become visible promptly even if an invalidation is
/// missed.
#[async_trait]
pub trait MappingCache: Send + Sync + 'static {
    /// Get a mapping from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Store a mapping in cache.
    async fn set(&self, code: &ShortCode, mapping: &UrlMapping) -> Result<()>;

    /// Remove a mapping from cache. Not an error if the key is absent.
    async fn invalidate(&self, code: &ShortCode) -> Result<()>;

    /// Get a mapping from cache, computing it if not present.
    async fn get_or_compute<F, Fut>(&self, code: &ShortCode, fetch: F) -> Result<Option<UrlMapping>>
    where
        F: FnOnce(&ShortCode) -> Fut + Send,
        Fut: Future<Output = Result<Option<UrlMapping>>> + Send,
    {
        match self.get(code).await? {
            Some(mapping) => Ok(Some(mapping)),
            None => {
                let mapping = fetch(code).await?;
                if let Some(ref value) = mapping {
                    self.set(code, value).await?;
                }
                Ok(mapping)
            }
        }
    }
}
