//! Layered error definitions
//!
//! Categorized by source: config / device / outbound

use thiserror::Error;

use crate::DeviceSerial;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Device Errors =====
    /// Callback carried a serial that no frame is bound to
    #[error("unknown device serial {serial}")]
    UnknownDevice { serial: DeviceSerial },

    /// Hardware reported an error through the SDK error callback
    #[error("device fault (code {code}): {description}")]
    DeviceFault {
        serial: Option<DeviceSerial>,
        code: i32,
        description: String,
    },

    // ===== Outbound Errors =====
    /// The remote client went away; terminal for the current session
    #[error("outbound channel '{channel}' closed: {message}")]
    ChannelClosed { channel: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create outbound channel closed error
    pub fn channel_closed(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ChannelClosed {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Whether this error ends the outbound session
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ChannelClosed { .. } | Self::Io(_))
    }
}
