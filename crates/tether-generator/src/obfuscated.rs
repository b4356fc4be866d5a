use crate::error::GeneratorError;
use crate::seq::{encode_offset, Sequence};
use crate::Generator;
use tether_core::ShortCode;
use typed_builder::TypedBuilder;

const SPACE_BITS: u32 = 40;
const SPACE_MASK: u64 = (1_u64 << SPACE_BITS) - 1;

/// A bijective scramble of the 40-bit sequence space.
///
/// Multiplying by an odd number and XOR-ing with a mask are both
/// permutations modulo `2^40`, so distinct inputs always map to distinct
/// outputs while consecutive inputs land far apart.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Obfuscator {
    /// Forced odd before use.
    #[builder(default = 0x9E37_79B9_7F4A_7C15)]
    multiplier: u64,
    #[builder(default = 0xDEAD_BEEF_CAFE_BABE)]
    mask: u64,
}

impl Obfuscator {
    pub fn multiplier(&self) -> u64 {
        self.multiplier | 1
    }

    pub fn mask(&self) -> u64 {
        self.mask & SPACE_MASK
    }

    /// Scrambles `value`, which must lie in the 40-bit space.
    pub fn obfuscate(&self, value: u64) -> Option<u64> {
        if value > SPACE_MASK {
            return None;
        }
        Some((value.wrapping_mul(self.multiplier()) ^ self.mask()) & SPACE_MASK)
    }
}

/// A sequential generator whose codes do not reveal creation order or volume.
///
/// Counter values are scrambled by an [`Obfuscator`] before base62
/// encoding. Codes are 5-7 characters and stay collision-free by
/// construction for the first `2^40` values.
#[derive(Debug)]
pub struct ObfuscatedSeqGenerator {
    sequence: Sequence,
    obfuscator: Obfuscator,
}

impl ObfuscatedSeqGenerator {
    pub fn new(obfuscator: Obfuscator) -> Self {
        Self::with_offset(obfuscator, 0)
    }

    pub fn with_offset(obfuscator: Obfuscator, offset: u64) -> Self {
        Self {
            sequence: Sequence::starting_at(offset),
            obfuscator,
        }
    }

    /// Continues after the given store high-water mark.
    pub fn resume_after(obfuscator: Obfuscator, max_id: Option<i64>) -> Self {
        let offset = max_id.map_or(0, |id| u64::try_from(id).unwrap_or(0));
        Self::with_offset(obfuscator, offset)
    }
}

impl Generator for ObfuscatedSeqGenerator {
    fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let scrambled = self
            .obfuscator
            .obfuscate(self.sequence.next())
            .ok_or(GeneratorError::SequenceExhausted)?;
        encode_offset(scrambled)
    }
}
