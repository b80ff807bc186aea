//! Gesture engine errors

use contracts::ContractError;
use thiserror::Error;

/// Errors raised while building frames or feeding them samples
#[derive(Debug, Error)]
pub enum EngineError {
    /// Per-axis sample addressed an axis the frame does not have
    #[error("axis index {index} out of range for {axes}-axis frame")]
    InvalidAxis { index: usize, axes: usize },

    /// Frame construction from an invalid configuration
    #[error(transparent)]
    Config(#[from] ContractError),
}
