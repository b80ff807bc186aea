//! # Device Bridge
//!
//! Hardware SDK callback surface.
//!
//! Responsibilities:
//! - Demultiplex `DeviceEvent`s to frames by serial number
//! - Track attach/detach/fault per device
//! - Drop and count callbacks from unknown serials
//! - Provide simulated `DeviceSource`s for running without hardware

pub mod error;
pub mod metrics;
pub mod registry;
pub mod simulated;

pub use contracts::{DeviceEvent, DeviceEventCallback, DeviceKind, DeviceSerial, DeviceSource};
pub use error::BridgeError;
pub use metrics::{BridgeMetrics, BridgeMetricsSnapshot};
pub use registry::DeviceRegistry;
pub use simulated::{SimulatedAccelerometer, SimulatedConfig, SimulatedEncoder};
