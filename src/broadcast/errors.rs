//! Broadcast error types.

use thiserror::Error;

/// Errors surfaced by transports.
///
/// The broadcaster itself never propagates these to callers; they are
/// counted and the scoring operation carries on.
#[derive(Debug, Error)]
pub enum BroadcastError {
    /// Transport could not serialize the outgoing payload
    #[error("payload serialization failed: {0}")]
    Serialization(String),

    /// Transport failed to hand the payload to the wire
    #[error("publish to channel '{channel}' failed: {reason}")]
    PublishFailed { channel: String, reason: String },
}

impl BroadcastError {
    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            BroadcastError::Serialization(_) => "SCORE_BROADCAST_SERIALIZE",
            BroadcastError::PublishFailed { .. } => "SCORE_BROADCAST_PUBLISH",
        }
    }
}

/// Result type for broadcast operations
pub type BroadcastResult<T> = Result<T, BroadcastError>;
