use crate::error::GeneratorError;
use crate::Generator;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::base62;
use tether_core::shortcode::{ShortCode, MAX_LENGTH, MIN_LENGTH};

/// Added to every sequence value so the shortest encoding has
/// `MIN_LENGTH` digits ("10000").
pub(crate) const FLOOR: u64 = 14_776_336; // 62^4

/// First value whose encoding exceeds `MAX_LENGTH` digits.
pub(crate) const CEILING: u64 = 839_299_365_868_340_224; // 62^10

/// A monotonically increasing counter shared by the sequential generators.
#[derive(Debug)]
pub(crate) struct Sequence(AtomicU64);

impl Sequence {
    pub(crate) fn starting_at(value: u64) -> Self {
        Self(AtomicU64::new(value))
    }

    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub(crate) fn peek(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Encodes `value` as a short code, offset past the leading-zero range.
pub(crate) fn encode_offset(value: u64) -> Result<ShortCode, GeneratorError> {
    let offset = value
        .checked_add(FLOOR)
        .filter(|v| *v < CEILING)
        .ok_or(GeneratorError::SequenceExhausted)?;
    let encoded = base62::encode(offset);
    debug_assert!((MIN_LENGTH..=MAX_LENGTH).contains(&encoded.len()));
    Ok(ShortCode::new_unchecked(encoded))
}

/// A short code generator using a sequential counter.
///
/// Each counter value is encoded in base62 after adding `62^4`, so codes
/// start at five characters ("10000") and never carry a leading zero.
/// Two distinct counter values never produce the same code.
///
/// The counter is local to this instance. After a restart, seed it from
/// the store's surrogate key with [`SeqGenerator::resume_after`]; any
/// overlap with codes already handed out is absorbed by the store's
/// duplicate check.
#[derive(Debug)]
pub struct SeqGenerator {
    sequence: Sequence,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            sequence: Sequence::starting_at(self.sequence.peek()),
        }
    }
}

impl SeqGenerator {
    /// Creates a generator whose first code encodes counter value zero.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific counter value.
    ///
    /// [`resume_after`](Self::resume_after) seeds this from the store so a
    /// restarted writer skips the codes it already handed out.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            sequence: Sequence::starting_at(offset),
        }
    }

    /// Creates a generator that continues after the given store high-water mark.
    ///
    /// Row ids start at 1 and track counter values from 0, so the next
    /// unused counter value equals `max_id`.
    pub fn resume_after(max_id: Option<i64>) -> Self {
        let offset = max_id.map_or(0, |id| u64::try_from(id).unwrap_or(0));
        Self::with_offset(offset)
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        encode_offset(self.sequence.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_codes() {
        let generator = SeqGenerator::new();

        assert_eq!(generator.generate().unwrap().as_str(), "10000");
        assert_eq!(generator.generate().unwrap().as_str(), "10001");
        assert_eq!(generator.generate().unwrap().as_str(), "10002");
    }

    #[test]
    fn codes_roll_over_into_letters() {
        let generator = SeqGenerator::with_offset(9);

        assert_eq!(generator.generate().unwrap().as_str(), "10009");
        assert_eq!(generator.generate().unwrap().as_str(), "1000A");
    }

    #[test]
    fn resume_after_store_high_water_mark() {
        assert_eq!(
            SeqGenerator::resume_after(None).generate().unwrap().as_str(),
            "10000"
        );
        assert_eq!(
            SeqGenerator::resume_after(Some(62)).generate().unwrap().as_str(),
            "10010"
        );
    }

    #[test]
    fn resume_after_seeds_the_offset() {
        for max_id in [1_i64, 61, 3_844] {
            let resumed = SeqGenerator::resume_after(Some(max_id));
            let explicit = SeqGenerator::with_offset(max_id as u64);
            assert_eq!(resumed.generate().unwrap(), explicit.generate().unwrap());
        }
        let negative = SeqGenerator::resume_after(Some(-5));
        assert_eq!(negative.generate().unwrap().as_str(), "10000");
    }

    #[test]
    fn longest_code_has_ten_characters() {
        let generator = SeqGenerator::with_offset(CEILING - FLOOR - 1);

        assert_eq!(generator.generate().unwrap().as_str(), "zzzzzzzzzz");
        assert_eq!(generator.generate(), Err(GeneratorError::SequenceExhausted));
    }

    #[test]
    fn exhausted_near_u64_max() {
        let generator = SeqGenerator::with_offset(u64::MAX);
        assert_eq!(generator.generate(), Err(GeneratorError::SequenceExhausted));
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeqGenerator>();
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SeqGenerator::new();
        generator.generate().unwrap();
        generator.generate().unwrap();

        let cloned = generator.clone();

        assert_eq!(generator.generate().unwrap().as_str(), "10002");
        assert_eq!(cloned.generate().unwrap().as_str(), "10002");
    }

    #[test]
    fn constants_match_base62_powers() {
        assert_eq!(base62::pow(4), Some(FLOOR));
        assert_eq!(base62::pow(10), Some(CEILING));
    }
}
