//! DeviceRegistry - serial number → frame demultiplexer
//!
//! SDK callbacks arrive on arbitrary threads. Each one carries a serial; the
//! registry finds the frame bound to that serial and forwards the event.
//! Frames registered without a serial are adopted by the first attaching
//! device of the matching kind.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use contracts::{DeviceEvent, DeviceEventCallback, DeviceKind, DeviceSerial, DevicesConfig};
use gesture_engine::{DeviceState, FrameHandle, SpinFrame, TiltFrame};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::BridgeError;
use crate::metrics::BridgeMetrics;

/// A frame the registry can route events to
#[derive(Debug, Clone)]
enum FrameSlot {
    Tilt(FrameHandle<TiltFrame>),
    Spin(FrameHandle<SpinFrame>),
}

impl FrameSlot {
    fn kind(&self) -> DeviceKind {
        match self {
            Self::Tilt(_) => DeviceKind::Accelerometer,
            Self::Spin(_) => DeviceKind::Encoder,
        }
    }

    fn state(&self) -> DeviceState {
        match self {
            Self::Tilt(frame) => frame.lock().state(),
            Self::Spin(frame) => frame.lock().state(),
        }
    }

    fn mark_attached(&self, serial: DeviceSerial) {
        match self {
            Self::Tilt(frame) => frame.lock().mark_attached(serial),
            Self::Spin(frame) => frame.lock().mark_attached(serial),
        }
    }

    fn mark_detached(&self) {
        match self {
            Self::Tilt(frame) => frame.lock().mark_detached(),
            Self::Spin(frame) => frame.lock().mark_detached(),
        }
    }

    fn mark_faulted(&self) {
        match self {
            Self::Tilt(frame) => frame.lock().mark_faulted(),
            Self::Spin(frame) => frame.lock().mark_faulted(),
        }
    }
}

#[derive(Debug, Default)]
struct Bindings {
    bound: HashMap<DeviceSerial, FrameSlot>,
    /// Frames waiting for a device to attach, in registration order
    unbound: Vec<FrameSlot>,
}

/// Routes device callbacks to frames
#[derive(Debug)]
pub struct DeviceRegistry {
    bindings: RwLock<Bindings>,
    metrics: Arc<BridgeMetrics>,
    /// Bumped on every attach so waiters can re-check
    attach_tx: watch::Sender<u64>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (attach_tx, _) = watch::channel(0);
        Self {
            bindings: RwLock::new(Bindings::default()),
            metrics: Arc::new(BridgeMetrics::new()),
            attach_tx,
        }
    }

    /// Registry with one tilt frame and one spin frame, pre-bound to the
    /// configured serials where present
    #[instrument(name = "registry_from_config", skip_all)]
    pub fn from_config(
        devices: &DevicesConfig,
        tilt: FrameHandle<TiltFrame>,
        spin: FrameHandle<SpinFrame>,
    ) -> Result<Self, BridgeError> {
        let registry = Self::new();
        registry.register_tilt(tilt, devices.accelerometer_serial)?;
        registry.register_spin(spin, devices.encoder_serial)?;
        Ok(registry)
    }

    /// Register a tilt frame, optionally pre-bound to a serial
    pub fn register_tilt(
        &self,
        frame: FrameHandle<TiltFrame>,
        serial: Option<DeviceSerial>,
    ) -> Result<(), BridgeError> {
        self.register(FrameSlot::Tilt(frame), serial)
    }

    /// Register a spin frame, optionally pre-bound to a serial
    pub fn register_spin(
        &self,
        frame: FrameHandle<SpinFrame>,
        serial: Option<DeviceSerial>,
    ) -> Result<(), BridgeError> {
        self.register(FrameSlot::Spin(frame), serial)
    }

    fn register(&self, slot: FrameSlot, serial: Option<DeviceSerial>) -> Result<(), BridgeError> {
        let kind = slot.kind();
        let mut bindings = self.write();
        match serial {
            Some(serial) => {
                if bindings.bound.contains_key(&serial) {
                    return Err(BridgeError::AlreadyBound { serial });
                }
                bindings.bound.insert(serial, slot);
                debug!(%serial, %kind, "frame pre-bound");
            }
            None => {
                bindings.unbound.push(slot);
                debug!(%kind, "frame awaiting attach");
            }
        }
        Ok(())
    }

    /// Shared counters
    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Callback to hand to a `DeviceSource`
    pub fn callback(self: &Arc<Self>) -> DeviceEventCallback {
        let registry = Arc::clone(self);
        Arc::new(move |event| registry.handle_event(event))
    }

    /// Route one SDK callback
    pub fn handle_event(&self, event: DeviceEvent) {
        match event {
            DeviceEvent::Attached { serial, kind } => self.on_attach(serial, kind),
            DeviceEvent::Detached { serial } => self.on_detach(serial),
            DeviceEvent::Error {
                serial,
                code,
                description,
            } => self.on_error(serial, code, &description),
            DeviceEvent::Acceleration { serial, values, .. } => match self.slot(serial) {
                Some(FrameSlot::Tilt(frame)) => {
                    frame.lock().ingest(values);
                    self.record_ingested(DeviceKind::Accelerometer);
                }
                Some(FrameSlot::Spin(_)) => self.on_mismatch(serial, "acceleration"),
                None => self.on_unknown(serial),
            },
            DeviceEvent::AxisSample {
                serial,
                index,
                value,
                ..
            } => match self.slot(serial) {
                Some(FrameSlot::Tilt(frame)) => {
                    if let Err(e) = frame.lock().ingest_axis(index, value) {
                        warn!(%serial, error = %e, "axis sample rejected");
                        self.metrics.record_mismatched();
                        return;
                    }
                    self.record_ingested(DeviceKind::Accelerometer);
                }
                Some(FrameSlot::Spin(_)) => self.on_mismatch(serial, "axis sample"),
                None => self.on_unknown(serial),
            },
            DeviceEvent::PositionChange {
                serial,
                position_change,
                ..
            } => match self.slot(serial) {
                Some(FrameSlot::Spin(frame)) => {
                    frame.lock().ingest(position_change);
                    self.record_ingested(DeviceKind::Encoder);
                }
                Some(FrameSlot::Tilt(_)) => self.on_mismatch(serial, "position change"),
                None => self.on_unknown(serial),
            },
        }
    }

    /// Serial of an attached device of the given kind
    pub fn attached_serial(&self, kind: DeviceKind) -> Option<DeviceSerial> {
        self.read()
            .bound
            .iter()
            .find(|(_, slot)| slot.kind() == kind && slot.state() == DeviceState::Attached)
            .map(|(serial, _)| *serial)
    }

    pub fn is_attached(&self, kind: DeviceKind) -> bool {
        self.attached_serial(kind).is_some()
    }

    /// Bound serials and their kinds, sorted by serial
    pub fn bound_serials(&self) -> Vec<(DeviceSerial, DeviceKind)> {
        let mut serials: Vec<_> = self
            .read()
            .bound
            .iter()
            .map(|(serial, slot)| (*serial, slot.kind()))
            .collect();
        serials.sort();
        serials
    }

    /// Wait until a device of the given kind is attached
    #[instrument(name = "registry_wait_for_attach", skip(self), fields(kind = %kind))]
    pub async fn wait_for_attach(
        &self,
        kind: DeviceKind,
        timeout: Duration,
    ) -> Result<DeviceSerial, BridgeError> {
        let mut rx = self.attach_tx.subscribe();
        let wait = async {
            loop {
                if let Some(serial) = self.attached_serial(kind) {
                    return Some(serial);
                }
                if rx.changed().await.is_err() {
                    return None;
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(Some(serial)) => Ok(serial),
            _ => Err(BridgeError::attach_timeout(kind, timeout)),
        }
    }

    fn on_attach(&self, serial: DeviceSerial, kind: DeviceKind) {
        let slot = {
            let mut guard = self.write();
            let bindings = &mut *guard;
            match bindings.bound.get(&serial).cloned() {
                Some(slot) if slot.kind() == kind => Some(slot),
                Some(slot) => {
                    warn!(%serial, %kind, bound = %slot.kind(), "attach kind differs from binding");
                    None
                }
                None => {
                    let position = bindings.unbound.iter().position(|s| s.kind() == kind);
                    position.map(|i| {
                        let slot = bindings.unbound.remove(i);
                        bindings.bound.insert(serial, slot.clone());
                        slot
                    })
                }
            }
        };

        let Some(slot) = slot else {
            self.on_unknown(serial);
            return;
        };

        slot.mark_attached(serial);
        self.metrics.record_attach();
        observability::record_device_attached(kind, true);
        info!(%serial, %kind, "device attached");
        self.attach_tx.send_modify(|generation| *generation += 1);
    }

    fn on_detach(&self, serial: DeviceSerial) {
        let Some(slot) = self.slot(serial) else {
            self.on_unknown(serial);
            return;
        };
        slot.mark_detached();
        self.metrics.record_detach();
        observability::record_device_attached(slot.kind(), false);
        info!(%serial, kind = %slot.kind(), "device detached");
    }

    fn on_error(&self, serial: Option<DeviceSerial>, code: i32, description: &str) {
        self.metrics.record_fault();
        observability::record_device_fault(code);

        match serial.and_then(|serial| self.slot(serial)) {
            Some(slot) => {
                slot.mark_faulted();
                error!(?serial, code, description, kind = %slot.kind(), "device fault, frame inactive until re-attach");
            }
            None => error!(?serial, code, description, "device fault"),
        }
    }

    fn on_unknown(&self, serial: DeviceSerial) {
        self.metrics.record_unknown_device();
        observability::record_unknown_device();
        warn!(%serial, "event from unknown device dropped");
    }

    fn on_mismatch(&self, serial: DeviceSerial, what: &str) {
        self.metrics.record_mismatched();
        warn!(%serial, what, "sample does not match bound frame, dropped");
    }

    fn record_ingested(&self, kind: DeviceKind) {
        self.metrics.record_ingested();
        observability::record_sample_ingested(kind);
    }

    fn slot(&self, serial: DeviceSerial) -> Option<FrameSlot> {
        self.read().bound.get(&serial).cloned()
    }

    fn read(&self) -> RwLockReadGuard<'_, Bindings> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Bindings> {
        self.bindings.write().unwrap_or_else(PoisonError::into_inner)
    }
}
