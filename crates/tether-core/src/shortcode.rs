use crate::base62;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

pub const MIN_LENGTH: usize = 5;
pub const MAX_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortCodeError {
    #[error("length must be between {MIN_LENGTH} and {MAX_LENGTH}, got {0}")]
    Length(usize),
    #[error("must contain only base62 characters: '{0}'")]
    Alphabet(String),
}

/// A validated short code identifier for a shortened URL.
///
/// Short codes are 5-10 characters long over the base62 alphabet
/// `[0-9A-Za-z]`. They are the only external identifier of a mapping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(String);

impl ShortCode {
    /// Creates a new `ShortCode` after validating the input.
    pub fn parse(code: impl Into<String>) -> Result<Self, ShortCodeError> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes read back from a trusted store.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), ShortCodeError> {
        // all valid characters are ASCII, so byte length is char length
        if !code.chars().all(base62::is_base62) {
            return Err(ShortCodeError::Alphabet(code.to_string()));
        }

        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(ShortCodeError::Length(code.len()));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ShortCode {
    type Error = ShortCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ShortCode> for String {
    fn from(code: ShortCode) -> Self {
        code.0
    }
}
