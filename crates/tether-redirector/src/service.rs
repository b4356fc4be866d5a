use std::sync::Arc;

use crate::policy::{AlwaysAvailable, AvailabilityPolicy};
use crate::redirector::Redirector;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use jiff::Timestamp;
use tether_core::{ReadStore, ShortCode, TargetUrl};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Reads the mapping for a code and decides between redirecting,
/// `NotFound` and `Gone`. It holds no state of its own between calls.
#[derive(Debug, Clone)]
pub struct RedirectResolver<R, P = AlwaysAvailable> {
    store: Arc<R>,
    policy: P,
}

impl<R: ReadStore> RedirectResolver<R> {
    /// Creates a resolver that serves every live mapping.
    pub fn new(store: R) -> Self {
        Self::with_policy(store, AlwaysAvailable)
    }
}

impl<R: ReadStore, P: AvailabilityPolicy> RedirectResolver<R, P> {
    pub fn with_policy(store: R, policy: P) -> Self {
        Self {
            store: Arc::new(store),
            policy,
        }
    }

    /// Resolves a short code given as a raw string.
    ///
    /// A string that is not a well-formed short code was never assigned,
    /// so it is reported as `NotFound`.
    pub async fn resolve(&self, code: &str) -> Result<TargetUrl> {
        let code = ShortCode::parse(code).map_err(|e| {
            trace!(code, error = %e, "malformed short code");
            RedirectorError::NotFound(code.to_string())
        })?;
        Redirector::resolve(self, &code).await
    }
}

#[async_trait]
impl<R: ReadStore, P: AvailabilityPolicy> Redirector for RedirectResolver<R, P> {
    async fn resolve(&self, code: &ShortCode) -> Result<TargetUrl> {
        trace!(code = %code, "resolving short code");

        let mapping = self.store.get_by_code(code).await.map_err(|e| {
            trace!(code = %code, error = %e, "lookup failed");
            RedirectorError::from(e)
        })?;

        if mapping.is_deleted() {
            debug!(code = %code, "short code is deleted");
            return Err(RedirectorError::Gone(code.to_string()));
        }

        if !self.policy.is_available(&mapping, Timestamp::now()) {
            debug!(code = %code, "short code is no longer available");
            return Err(RedirectorError::Gone(code.to_string()));
        }

        debug!(code = %code, url = %mapping.target_url, "resolved short code");
        Ok(mapping.target_url)
    }
}
