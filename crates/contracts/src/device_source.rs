//! DeviceSource trait - Hardware event source abstraction
//!
//! Decouples the registry from concrete devices: an SDK binding and a
//! simulated device look the same to the rest of the pipeline.

use std::sync::Arc;

use crate::{DeviceEvent, DeviceKind, DeviceSerial};

/// Device event callback type
///
/// Invoked from the device's own thread; must be cheap and never block on
/// the dispatch side.
pub type DeviceEventCallback = Arc<dyn Fn(DeviceEvent) + Send + Sync>;

/// Device event source trait
///
/// # Example
///
/// ```ignore
/// let device: Box<dyn DeviceSource> = open_accelerometer();
/// device.listen(registry.callback());
/// // ... run session ...
/// device.stop();
/// ```
pub trait DeviceSource: Send + Sync {
    /// Device serial number
    fn serial(&self) -> DeviceSerial;

    /// Device type
    fn kind(&self) -> DeviceKind;

    /// Register the event callback and start producing events.
    ///
    /// Repeated calls while listening are ignored.
    fn listen(&self, callback: DeviceEventCallback);

    /// Stop producing events; emits a final `Detached`.
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
