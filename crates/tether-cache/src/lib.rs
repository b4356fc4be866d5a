//! Read-path caching for the mapping store.
//!
//! [`MokaMappingCache`] is a bounded in-memory cache with a mandatory TTL,
//! and [`CachedStore`] puts any [`MappingCache`](tether_core::MappingCache)
//! in front of a store, filling on read and invalidating on every write.

pub mod moka;
pub mod store;

pub use self::moka::{CacheSettings, MokaMappingCache};
pub use store::CachedStore;
