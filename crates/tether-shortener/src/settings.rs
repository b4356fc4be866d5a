use serde::Deserialize;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder, Deserialize)]
#[serde(default)]
pub struct ShortenerSettings {
    /// How many generated codes `create` tries before giving up. Zero is
    /// treated as one.
    #[builder(default = 5)]
    pub max_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
