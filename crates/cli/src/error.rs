//! Error types for CLI operations.

use contracts::ContractError;
use device_bridge::BridgeError;
use dispatcher::DispatcherError;
use gesture_engine::EngineError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parsing or validation error
    #[error(transparent)]
    Config(#[from] ContractError),

    /// Frame construction error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Device registry error
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Dispatch loop error
    #[error(transparent)]
    Dispatch(#[from] DispatcherError),

    /// Metrics exporter or other setup error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
