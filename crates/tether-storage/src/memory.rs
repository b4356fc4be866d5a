use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use std::sync::atomic::{AtomicI64, Ordering};
use tether_core::error::{Result, StoreError};
use tether_core::store::{guard_delete, guard_update, DeleteGuard, MappingStore, ReadStore};
use tether_core::{ShortCode, TargetUrl, UrlMapping};
use tracing::trace;

/// In-memory implementation of the mapping store using DashMap.
///
/// DashMap shards its locks, so operations on different codes proceed in
/// parallel while every operation on one code holds that code's shard
/// lock for its whole check-and-write.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, UrlMapping>,
    last_id: AtomicI64,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held, tombstones included.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadStore for InMemoryStore {
    async fn get_by_code(&self, code: &ShortCode) -> Result<UrlMapping> {
        self.storage
            .get(code.as_str())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        let last = self.last_id.load(Ordering::SeqCst);
        Ok((last > 0).then_some(last))
    }
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn insert(&self, code: &ShortCode, target_url: &TargetUrl) -> Result<UrlMapping> {
        // Tombstones stay in the map, so a deleted code is also rejected here.
        match self.storage.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateCode(code.to_string())),
            Entry::Vacant(slot) => {
                let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
                let mapping =
                    UrlMapping::new(id, code.clone(), target_url.clone(), Timestamp::now());
                slot.insert(mapping.clone());
                trace!(code = %code, id, "inserted mapping");
                Ok(mapping)
            }
        }
    }

    async fn update(
        &self,
        code: &ShortCode,
        target_url: &TargetUrl,
        expected_version: u64,
    ) -> Result<UrlMapping> {
        let mut entry = self
            .storage
            .get_mut(code.as_str())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        guard_update(entry.value(), expected_version)?;
        entry
            .value_mut()
            .retarget(target_url.clone(), Timestamp::now());

        Ok(entry.value().clone())
    }

    async fn soft_delete(&self, code: &ShortCode, expected_version: u64) -> Result<()> {
        let mut entry = self
            .storage
            .get_mut(code.as_str())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        if guard_delete(entry.value(), expected_version)? == DeleteGuard::Apply {
            entry.value_mut().tombstone(Timestamp::now());
        }
        Ok(())
    }
}
