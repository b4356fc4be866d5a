//! Short code generators.
//!
//! Generators are pure: they never consult storage. Uniqueness against
//! existing mappings is enforced by the store at insert time, and the
//! shortener retries with a fresh code on conflict.

pub mod error;
pub mod obfuscated;
pub mod random;
pub mod seq;
pub mod settings;

pub use error::GeneratorError;
pub use obfuscated::{ObfuscatedSeqGenerator, Obfuscator};
pub use random::RandomGenerator;
pub use seq::SeqGenerator;
pub use settings::GeneratorSettings;

use std::sync::Arc;
use tether_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations can vary from sequence encoders, which are collision-free
/// by construction, to random draws that rely on the store's collision check.
pub trait Generator: Send + Sync + 'static {
    /// Produces the next candidate short code.
    fn generate(&self) -> Result<ShortCode, GeneratorError>;
}

impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        (**self).generate()
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        (**self).generate()
    }
}
