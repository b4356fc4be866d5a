//! Core types and traits for the Tether URL shortener.
//!
//! This crate provides the shared vocabulary used by the generator,
//! storage, cache, shortener and redirector crates: validated short codes
//! and target URLs, the persisted [`UrlMapping`] record, the store and
//! cache contracts, and the error taxonomy.

pub mod base62;
pub mod cache;
pub mod error;
pub mod mapping;
pub mod shortcode;
pub mod store;
pub mod target_url;

pub use cache::MappingCache;
pub use error::{CacheError, ErrorKind, StoreError};
pub use mapping::UrlMapping;
pub use shortcode::ShortCode;
pub use store::{MappingStore, ReadStore};
pub use target_url::TargetUrl;
