//! Typed failure modes for the engine's fallible subsystems.
//!
//! Per the error handling design, unrecognized or missing *data* is never an
//! error — it is surfaced as an `Unknown` value with `requires_review` set.
//! [`LreError`] exists only for the handful of operations that have a real
//! failure mode outside that contract: deserializing a malformed knowledge
//! base overlay, or a caller passing a structurally invalid expression through
//! a path that demands a hard error rather than a first-class `Unknown`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LreError {
    #[error("invalid license expression {expression:?}: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("malformed knowledge base overlay: {0}")]
    InvalidOverlay(String),

    #[error("failed to parse overlay document")]
    OverlayDeserialize(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type LreResult<T> = Result<T, LreError>;
