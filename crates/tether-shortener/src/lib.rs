//! Write path of the shortener: create, retarget and delete mappings.
//!
//! [`ShortenerService`] validates input, draws codes from a
//! [`Generator`](tether_generator::Generator) and retries on code
//! collisions. Updates and deletes use the stored version for optimistic
//! concurrency and report conflicts to the caller instead of retrying.

pub mod error;
pub mod service;
pub mod settings;
pub mod shortener;

pub use error::{Result, ShortenerError};
pub use service::ShortenerService;
pub use settings::ShortenerSettings;
pub use shortener::Shortener;
