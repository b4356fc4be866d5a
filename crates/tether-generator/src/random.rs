use crate::error::GeneratorError;
use crate::Generator;
use parking_lot::Mutex;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tether_core::shortcode::{ShortCode, MAX_LENGTH, MIN_LENGTH};

/// Default code length. 62^7 gives roughly 3.5e12 codes.
pub const DEFAULT_LENGTH: usize = 7;

/// A short code generator drawing fixed-length random base62 strings.
///
/// Draws may collide with existing codes; the store rejects duplicates and
/// the shortener retries with a fresh draw.
#[derive(Debug)]
pub struct RandomGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        Self::with_rng(length, StdRng::from_os_rng())
    }

    /// Creates a deterministic generator, for reproducible tests.
    pub fn with_seed(length: usize, seed: u64) -> Result<Self, GeneratorError> {
        Self::with_rng(length, StdRng::seed_from_u64(seed))
    }

    fn with_rng(length: usize, rng: StdRng) -> Result<Self, GeneratorError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(GeneratorError::InvalidLength {
                length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }

        Ok(Self {
            length,
            rng: Mutex::new(rng),
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let mut rng = self.rng.lock();
        let code: String = (&mut *rng)
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        Ok(ShortCode::new_unchecked(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_configured_length_and_alphabet() {
        let generator = RandomGenerator::new(DEFAULT_LENGTH).unwrap();

        for _ in 0..100 {
            let code = generator.generate().unwrap();
            assert_eq!(code.as_str().len(), DEFAULT_LENGTH);
            // re-validating proves the draw is a legal short code
            assert!(ShortCode::parse(code.as_str()).is_ok());
        }
    }

    #[test]
    fn rejects_lengths_outside_code_bounds() {
        assert!(matches!(
            RandomGenerator::new(4),
            Err(GeneratorError::InvalidLength { length: 4, .. })
        ));
        assert!(RandomGenerator::new(11).is_err());
        assert!(RandomGenerator::new(5).is_ok());
        assert!(RandomGenerator::new(10).is_ok());
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = RandomGenerator::with_seed(7, 42).unwrap();
        let b = RandomGenerator::with_seed(7, 42).unwrap();

        for _ in 0..10 {
            assert_eq!(a.generate().unwrap(), b.generate().unwrap());
        }
    }

    #[test]
    fn draws_rarely_repeat() {
        let generator = RandomGenerator::with_seed(DEFAULT_LENGTH, 7).unwrap();
        let codes: HashSet<_> = (0..10_000).map(|_| generator.generate().unwrap()).collect();
        assert_eq!(codes.len(), 10_000);
    }
}
