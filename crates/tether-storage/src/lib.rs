//! Mapping store backends.
//!
//! [`InMemoryStore`] keeps mappings in a sharded concurrent map, and
//! [`SqliteStore`] persists them in a single `url_mappings` table with a
//! unique index on the short code. [`Deadline`] wraps any store and turns
//! slow calls into [`StoreError::Timeout`].

pub mod deadline;
pub mod memory;
pub mod sqlite;

pub use deadline::{Deadline, DeadlineSettings};
pub use memory::InMemoryStore;
pub use sqlite::{SqliteSettings, SqliteStore};
pub use tether_core::error::{Result, StoreError};
pub use tether_core::store::{MappingStore, ReadStore};
