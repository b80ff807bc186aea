//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: the
//! server configuration, the gesture wire messages, hardware device events and
//! the traits at the seams (processors, outbound channels, device sources).
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Dispatch cadence is wall-clock (`sample_rate` seconds between ticks)
//! - Device timestamps are the SDK's own (milliseconds, f64) and only logged

mod config;
mod device;
mod device_source;
mod error;
mod message;
mod outbound;
mod processor;

pub use config::*;
pub use device::*;
pub use device_source::{DeviceEventCallback, DeviceSource};
pub use error::*;
pub use message::*;
pub use outbound::OutboundChannel;
pub use processor::GestureProcessor;
