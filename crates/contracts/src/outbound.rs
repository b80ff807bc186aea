//! OutboundChannel trait - Dispatch loop output interface
//!
//! The transport (WebRTC data channel, websocket, pipe) lives elsewhere; the
//! core only needs a non-blocking send that reports when the client is gone.

use crate::{ContractError, GestureMessage};

/// Outbound message channel
pub trait OutboundChannel: Send {
    /// Channel name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Hand one message to the transport without blocking.
    ///
    /// # Errors
    /// Any error means the client went away; the session ends. Transient
    /// congestion is not an error: implementations drop and return `Ok`.
    fn send(&mut self, message: GestureMessage) -> Result<(), ContractError>;
}
