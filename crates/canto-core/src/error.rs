//! Error types for canto-core.

use thiserror::Error;

/// Error type shared by every canto stage.
///
/// All of these indicate a caller-contract violation, not a transient
/// condition; retrying a pure pipeline reproduces the same error, so none of
/// them are recoverable.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown F0 method: {0:?}. Expected \"fast\" or \"robust\"")]
    InvalidMethod(String),

    #[error("Insufficient audio: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
