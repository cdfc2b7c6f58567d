//! Error types for the ledger engine.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Local store fault.
    #[error("store error: {0}")]
    Store(#[from] ledgerx_store::StoreError),

    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The remote endpoint answered with a non-success status.
    #[error("remote rejected batch with status {status}")]
    Remote {
        /// HTTP-like status code reported by the remote.
        status: u16,
    },

    /// A remote call exceeded its timeout.
    #[error("remote call timed out")]
    Timeout,

    /// Request or response body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

impl EngineError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Transport { retryable, .. } => *retryable,
            EngineError::Remote { .. } => true,
            EngineError::Timeout => true,
            _ => false,
        }
    }
}
