use crate::error::GeneratorError;
use crate::obfuscated::{ObfuscatedSeqGenerator, Obfuscator};
use crate::random::{RandomGenerator, DEFAULT_LENGTH};
use crate::seq::SeqGenerator;
use crate::Generator;
use serde::{Deserialize, Serialize};

/// Selects and parameterizes the code generation strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum GeneratorSettings {
    /// Plain base62 encoding of a counter.
    Sequential,
    /// Counter scrambled before encoding.
    Obfuscated {
        multiplier: Option<u64>,
        mask: Option<u64>,
    },
    /// Fixed-length random draw.
    Random {
        #[serde(default = "default_length")]
        length: usize,
    },
}

fn default_length() -> usize {
    DEFAULT_LENGTH
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings::Random {
            length: DEFAULT_LENGTH,
        }
    }
}

impl GeneratorSettings {
    /// Builds the generator. Sequential strategies continue after `max_id`,
    /// the store's surrogate-key high-water mark.
    pub fn build(&self, max_id: Option<i64>) -> Result<Box<dyn Generator>, GeneratorError> {
        let generator: Box<dyn Generator> = match self {
            GeneratorSettings::Sequential => Box::new(SeqGenerator::resume_after(max_id)),
            GeneratorSettings::Obfuscated { multiplier, mask } => {
                let defaults = Obfuscator::builder().build();
                let obfuscator = Obfuscator::builder()
                    .multiplier(multiplier.unwrap_or(defaults.multiplier()))
                    .mask(mask.unwrap_or(defaults.mask()))
                    .build();
                Box::new(ObfuscatedSeqGenerator::resume_after(obfuscator, max_id))
            }
            GeneratorSettings::Random { length } => Box::new(RandomGenerator::new(*length)?),
        };
        Ok(generator)
    }
}
