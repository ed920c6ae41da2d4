//! Store error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors from game persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No game with this id
    #[error("game not found: {0}")]
    NotFound(Uuid),

    /// A game with this id already exists
    #[error("game already exists: {0}")]
    AlreadyExists(Uuid),

    /// The record being saved was built from a stale read
    #[error("version conflict on game {game_id}: store holds version {stored}, save carried {attempted}")]
    VersionConflict {
        game_id: Uuid,
        stored: u64,
        attempted: u64,
    },

    /// Stored bytes fail integrity or shape checks
    #[error("corrupt game record: {0}")]
    Corrupt(String),

    /// Underlying filesystem failure
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "SCORE_STORE_NOT_FOUND",
            StoreError::AlreadyExists(_) => "SCORE_STORE_EXISTS",
            StoreError::VersionConflict { .. } => "SCORE_STORE_CONFLICT",
            StoreError::Corrupt(_) => "SCORE_STORE_CORRUPT",
            StoreError::Io(_) => "SCORE_STORE_IO",
            StoreError::Serialization(_) => "SCORE_STORE_SERIALIZE",
        }
    }

    /// Whether retrying the whole read-mutate-save cycle can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
