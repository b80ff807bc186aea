//! LogOutbound - logs gestures via tracing

use contracts::{ContractError, GestureMessage, OutboundChannel};
use tracing::info;

/// Outbound that logs every gesture; never disconnects
pub struct LogOutbound {
    name: String,
    sent: u64,
}

impl LogOutbound {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: 0,
        }
    }

    /// Messages logged so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl OutboundChannel for LogOutbound {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, message: GestureMessage) -> Result<(), ContractError> {
        self.sent += 1;
        match message {
            GestureMessage::Pan(v) => info!(outbound = %self.name, gesture = "pan", x = v.x, y = v.y, "gesture"),
            GestureMessage::Zoom(v) => info!(outbound = %self.name, gesture = "zoom", delta = v.delta, "gesture"),
        }
        Ok(())
    }
}
