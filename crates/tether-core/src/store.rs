use crate::error::{Result, StoreError};
use crate::mapping::UrlMapping;
use crate::shortcode::ShortCode;
use crate::target_url::TargetUrl;
use async_trait::async_trait;
use std::sync::Arc;

/// A read-only view of a mapping store.
///
/// This trait provides only the read operations from [`MappingStore`],
/// allowing services like the redirector to have read-only access.
#[async_trait]
pub trait ReadStore: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code, tombstoned or not.
    /// Returns `Err(NotFound)` if the code was never assigned.
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping>;

    /// The highest surrogate key handed out so far, if any.
    async fn max_id(&self) -> Result<Option<i64>>;
}

/// Durable persistence of the code to URL mapping.
///
/// Every operation is atomic with respect to the others for the same code:
/// code uniqueness on insert and the version check on mutation are closed
/// inside the store.
#[async_trait]
pub trait MappingStore: ReadStore {
    /// Inserts a new mapping at the initial version.
    ///
    /// Returns `Err(DuplicateCode)` if the code has ever been assigned,
    /// including to a tombstoned mapping.
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping>;

    /// Replaces the target of a live mapping whose stored version equals
    /// `expected_version`.
    ///
    /// Returns `Err(VersionMismatch)` on a lost race and `Err(Tombstoned)`
    /// if the mapping was deleted.
    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping>;

    /// Tombstones the mapping whose stored version equals `expected_version`.
    ///
    /// Deleting an already tombstoned mapping succeeds without change only
    /// when `expected_version` is its post-delete version.
    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()>;
}

/// Outcome of [`guard_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteGuard {
    /// The mapping is live at the expected version; tombstone it.
    Apply,
    /// The mapping is already tombstoned at the expected version; nothing to do.
    AlreadyDeleted,
}

/// Checks whether an update against `current` may proceed.
pub fn guard_update(current: &UrlMapping, expected_version: u64) -> Result<()> {
    if current.is_deleted() {
        return Err(StoreError::Tombstoned(current.short_code.to_string()));
    }
    check_version(current, expected_version)
}

/// Checks whether a soft delete against `current` may proceed.
pub fn guard_delete(current: &UrlMapping, expected_version: u64) -> Result<DeleteGuard> {
    check_version(current, expected_version)?;
    if current.is_deleted() {
        Ok(DeleteGuard::AlreadyDeleted)
    } else {
        Ok(DeleteGuard::Apply)
    }
}

fn check_version(current: &UrlMapping, expected_version: u64) -> Result<()> {
    if current.version != expected_version {
        return Err(StoreError::VersionMismatch {
            code: current.short_code.to_string(),
            expected: expected_version,
            actual: current.version,
        });
    }
    Ok(())
}

#[async_trait]
impl<S: ReadStore + ?Sized> ReadStore for Arc<S> {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        (**self).get_by_code(code).await
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        (**self).max_id().await
    }
}

#[async_trait]
impl<S: MappingStore + ?Sized> MappingStore for Arc<S> {
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping> {
        (**self).insert(code, target_url).await
    }

    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping> {
        (**self).update(code, target_url, expected_version).await
    }

    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        (**self).soft_delete(code, expected_version).await
    }
}
