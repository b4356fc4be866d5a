use tether_core::{ErrorKind, StoreError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code is gone: {0}")]
    Gone(String),
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl RedirectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RedirectorError::NotFound(_) => ErrorKind::NotFound,
            RedirectorError::Gone(_) => ErrorKind::Gone,
            RedirectorError::Store(_) => ErrorKind::StoreUnavailable,
        }
    }
}

impl From<StoreError> for RedirectorError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(code) => Self::NotFound(code),
            other => Self::Store(other),
        }
    }
}
