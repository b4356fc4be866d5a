use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetUrlError {
    #[error("URL cannot be empty")]
    Empty,
    #[error("URL is not absolute: {0}")]
    Malformed(String),
    #[error("URL scheme must be http or https: {0}")]
    Scheme(String),
    #[error("URL must have a host: {0}")]
    MissingHost(String),
}

/// A validated redirect target: an absolute `http`/`https` URL with a
/// non-empty host.
///
/// The URL is kept exactly as supplied (minus surrounding whitespace) so a
/// resolved mapping hands back the same string that was shortened.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetUrl(String);

impl TargetUrl {
    pub fn parse(raw: &str) -> Result<Self, TargetUrlError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TargetUrlError::Empty);
        }

        let parsed =
            Url::parse(raw).map_err(|e| TargetUrlError::Malformed(format!("{raw}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TargetUrlError::Scheme(parsed.scheme().to_string()));
        }

        // `Url` accepts `http:host` for special schemes; require the explicit authority.
        let lowered = raw.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return Err(TargetUrlError::Malformed(raw.to_string()));
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(TargetUrlError::MissingHost(raw.to_string())),
        }

        Ok(Self(raw.to_string()))
    }

    /// Wraps a URL read back from a trusted store without validation.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TargetUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TargetUrl {
    type Error = TargetUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetUrl> for String {
    fn from(url: TargetUrl) -> Self {
        url.0
    }
}
