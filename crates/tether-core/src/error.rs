use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The caller-visible failure classes of the mapping engine.
///
/// Every error type in the workspace classifies itself into exactly one
/// kind, which is what a transport layer maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The target URL is not an absolute `http`/`https` URL with a host.
    InvalidUrl,
    /// No mapping has ever existed for the short code.
    NotFound,
    /// The mapping existed but has been tombstoned.
    Gone,
    /// A uniqueness or version race; retry with fresh input.
    Conflict,
    /// No free short code could be produced within the retry budget.
    GenerationExhausted,
    /// The store failed or timed out; the outcome is indeterminate.
    StoreUnavailable,
}

impl ErrorKind {
    /// Whether an operation failing with this kind may be retried as-is.
    ///
    /// This only holds for operations that draw fresh input on each attempt
    /// (such as create). Versioned mutations must re-read state first.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Conflict | ErrorKind::StoreUnavailable)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Gone => "gone",
            ErrorKind::Conflict => "conflict",
            ErrorKind::GenerationExhausted => "generation_exhausted",
            ErrorKind::StoreUnavailable => "store_unavailable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
    /// A store failure raised while filling the cache.
    #[error(transparent)]
    Store(Box<StoreError>),
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("short code already exists: {0}")]
    DuplicateCode(String),
    #[error("version mismatch for {code}: expected {expected}, found {actual}")]
    VersionMismatch {
        code: String,
        expected: u64,
        actual: u64,
    },
    #[error("mapping is deleted: {0}")]
    Tombstoned(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("cache error: {0}")]
    Cache(CacheError),
}

impl From<CacheError> for StoreError {
    fn from(value: CacheError) -> Self {
        match value {
            CacheError::Store(inner) => *inner,
            other => StoreError::Cache(other),
        }
    }
}

impl StoreError {
    /// Classifies this error into the engine-wide taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::DuplicateCode(_)
            | StoreError::VersionMismatch { .. }
            | StoreError::Tombstoned(_) => ErrorKind::Conflict,
            StoreError::Unavailable(_)
            | StoreError::Timeout(_)
            | StoreError::Query(_)
            | StoreError::InvalidData(_)
            | StoreError::Cache(_) => ErrorKind::StoreUnavailable,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}
