use async_trait::async_trait;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tether_core::error::{Result, StoreError};
use tether_core::store::{MappingStore, ReadStore};
use tether_core::{ShortCode, TargetUrl, UrlMapping};
use tracing::warn;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct DeadlineSettings {
    /// Upper bound on a single store call.
    #[builder(default = Duration::from_secs(2))]
    pub timeout: Duration,
}

impl Default for DeadlineSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A store decorator that bounds every call with a timeout.
///
/// An elapsed call reports [`StoreError::Timeout`]. The outcome of the
/// abandoned call is unknown: it may or may not have committed, so callers
/// must re-read before retrying a versioned mutation.
#[derive(Debug, Clone)]
pub struct Deadline<S> {
    inner: S,
    timeout: Duration,
}

impl<S> Deadline<S> {
    pub fn new(inner: S, settings: &DeadlineSettings) -> Self {
        Self {
            inner,
            timeout: settings.timeout,
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        code: Option<&ShortCode>,
        fut: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let code = code.map(ShortCode::as_str).unwrap_or_default();
                warn!(operation, code, timeout = ?self.timeout, "store call timed out");
                Err(StoreError::Timeout(format!(
                    "{operation} exceeded {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<S: ReadStore> ReadStore for Deadline<S> {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        self.bounded("get_by_code", Some(code), self.inner.get_by_code(code))
            .await
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        self.bounded("max_id", None, self.inner.max_id()).await
    }
}

#[async_trait]
impl<S: MappingStore> MappingStore for Deadline<S> {
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping> {
        self.bounded("insert", Some(code), self.inner.insert(code, target_url))
            .await
    }

    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping> {
        self.bounded(
            "update",
            Some(code),
            self.inner.update(code, target_url, expected_version),
        )
        .await
    }

    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        self.bounded(
            "soft_delete",
            Some(code),
            self.inner.soft_delete(code, expected_version),
        )
        .await
    }
}
