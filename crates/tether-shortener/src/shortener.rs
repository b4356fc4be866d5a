use crate::Result;
use async_trait::async_trait;
use tether_core::UrlMapping;

/// Management operations on URL mappings.
///
/// Codes are taken as raw strings. A string that is not a well-formed
/// short code is reported as `NotFound`.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `target_url` under a freshly generated code.
    async fn create(&self, target_url: &str) -> Result<UrlMapping>;

    /// Points an existing code at a new target.
    async fn update(&self, code: &str, target_url: &str) -> Result<UrlMapping>;

    /// Soft-deletes the mapping. Deleting an already deleted mapping succeeds.
    async fn delete(&self, code: &str) -> Result<()>;

    /// Returns the stored mapping, deleted or not.
    async fn get(&self, code: &str) -> Result<UrlMapping>;
}
