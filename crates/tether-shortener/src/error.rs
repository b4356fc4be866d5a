use tether_core::target_url::TargetUrlError;
use tether_core::{ErrorKind, StoreError};
use tether_generator::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] TargetUrlError),
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("conflicting write: {0}")]
    Conflict(StoreError),
    #[error("no free short code after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("code generator failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl ShortenerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortenerError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ShortenerError::NotFound(_) => ErrorKind::NotFound,
            ShortenerError::Conflict(_) => ErrorKind::Conflict,
            ShortenerError::GenerationExhausted { .. } | ShortenerError::Generator(_) => {
                ErrorKind::GenerationExhausted
            }
            ShortenerError::Storage(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<StoreError> for ShortenerError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(code) => Self::NotFound(code),
            other if other.is_conflict() => Self::Conflict(other),
            other => Self::Storage(other),
        }
    }
}
