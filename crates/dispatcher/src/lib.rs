//! # Dispatcher
//!
//! Gesture dispatch loop.
//!
//! Responsibilities:
//! - Poll processors at a fixed interval in priority order
//! - Hand produced gestures to the outbound channel without blocking
//! - End the session when the client goes away or on shutdown

pub mod dispatch;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod outbound;

pub use contracts::{GestureMessage, GestureProcessor, OutboundChannel};
pub use dispatch::{DispatchLoop, DispatchLoopBuilder, EndReason, SessionEnd};
pub use error::DispatcherError;
pub use handle::{DispatchHandle, ShutdownTrigger};
pub use metrics::{DispatchMetrics, DispatchMetricsSnapshot};
pub use outbound::{create_outbound, ChannelOutbound, GestureReceiver, JsonLinesOutbound, LogOutbound};
