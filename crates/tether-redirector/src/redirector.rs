use crate::Result;
use async_trait::async_trait;
use tether_core::{ShortCode, TargetUrl};

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the URL a client should be redirected to.
    ///
    /// Fails with `NotFound` if the code was never assigned and `Gone` if
    /// the mapping has been deleted or is no longer available.
    async fn resolve(&self, code: &ShortCode) -> Result<TargetUrl>;
}
