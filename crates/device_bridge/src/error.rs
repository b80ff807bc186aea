//! Device bridge error types

use std::time::Duration;

use contracts::{ContractError, DeviceKind, DeviceSerial};
use gesture_engine::EngineError;
use thiserror::Error;

/// Device bridge specific error
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No device of the kind attached in time
    #[error("no {kind} attached within {timeout:?}")]
    AttachTimeout { kind: DeviceKind, timeout: Duration },

    /// Serial already bound to another frame
    #[error("device serial {serial} is already bound")]
    AlreadyBound { serial: DeviceSerial },

    /// Frame construction or ingestion error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl BridgeError {
    pub fn attach_timeout(kind: DeviceKind, timeout: Duration) -> Self {
        Self::AttachTimeout { kind, timeout }
    }
}
