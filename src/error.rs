//! Error Types
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias over
//! [`SkipGramError`]. Argument problems are reported immediately and never
//! produce partial output.

use thiserror::Error;

/// Errors produced while building pairs, vocabularies, models or checkpoints
#[derive(Debug, Error)]
pub enum SkipGramError {
    /// A caller-supplied argument is outside its valid range
    /// (negative window size, zero batch size, bad config value, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A token id does not exist in the model's vocabulary
    #[error("token id {id} is out of range for a vocabulary of {vocab_size} tokens")]
    TokenOutOfRange { id: usize, vocab_size: usize },

    /// Two buffers that must agree in size do not
    #[error("shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// A checkpoint file is malformed or was written by another format version
    #[error("invalid checkpoint: {0}")]
    Checkpoint(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SkipGramError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SkipGramError::InvalidArgument(msg.into())
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SkipGramError>;
