//! Read path of the shortener: turns a short code into the URL to
//! redirect to.
//!
//! [`RedirectResolver`] works over any [`ReadStore`](tether_core::ReadStore),
//! so it can sit directly on a store or on a
//! `tether_cache::CachedStore` for low-latency lookups.
//!
//! ```rust
//! use tether_cache::{CachedStore, MokaMappingCache};
//! use tether_core::{MappingStore, ShortCode, TargetUrl};
//! use tether_redirector::RedirectResolver;
//! use tether_storage::InMemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CachedStore::new(InMemoryStore::new(), MokaMappingCache::default());
//! store
//!     .insert(&ShortCode::parse("b7k2Q")?, &TargetUrl::parse("https://example.com/a")?)
//!     .await?;
//!
//! let resolver = RedirectResolver::new(store);
//! let target = resolver.resolve("b7k2Q").await?;
//! assert_eq!(target.as_str(), "https://example.com/a");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod policy;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use policy::{AlwaysAvailable, AvailabilityPolicy};
pub use redirector::Redirector;
pub use service::RedirectResolver;
