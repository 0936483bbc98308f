//! Error taxonomy.

use thiserror::Error;

/// Coarse classification of a failure, as seen by a caller.
///
/// Authentication failures are deliberately collapsed into these buckets: a
/// caller can learn *that* a request was rejected, never *which* check
/// rejected it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request itself is unusable (missing field, bad header shape).
    MalformedInput,
    /// Bad credentials, or a bad/expired token.
    Unauthenticated,
    /// Authenticated, but lacking a required role.
    Forbidden,
    /// The referenced entity does not exist.
    NotFound,
    /// A uniqueness or referential constraint rejected the write.
    Conflict,
    /// Store, hashing or signing failure. The cause stays server-side.
    Internal,
}

impl ErrorKind {
    /// HTTP status code conventionally associated with this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::MalformedInput => 400,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

/// Result type used by store adapters.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a credential, session-log or directory store.
///
/// Adapters classify driver errors into these variants from structured error
/// codes; callers branch on the variant, never on the message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Backend(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
