//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Builder finished without an outbound channel
    #[error("dispatch loop has no outbound channel")]
    MissingOutbound,

    /// Sample interval must be non-zero
    #[error("invalid dispatch interval: {message}")]
    InvalidInterval { message: String },

    /// Dispatch task panicked or was cancelled
    #[error("dispatch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Outbound error (from contract)
    #[error("outbound error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    pub fn invalid_interval(message: impl Into<String>) -> Self {
        Self::InvalidInterval {
            message: message.into(),
        }
    }
}
