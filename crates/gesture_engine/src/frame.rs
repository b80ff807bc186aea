//! Sensor frames: the per-device state shared between the device callbacks
//! (producers) and the gesture processors (consumers).
//!
//! A `TiltFrame` owns one absolute channel per raw accelerometer axis. The
//! sign of each raw axis travels with it; the X/Y swap only changes which
//! raw channel a logical axis reads. A `SpinFrame` owns a single relative
//! channel for the rotary encoder.

use std::time::Instant;

use contracts::{DeviceSerial, GestureConfig, Orientation};
use tracing::{debug, info};

use crate::channel::AxisChannel;
use crate::error::EngineError;

/// Number of accelerometer axes
pub const TILT_AXES: usize = 3;

/// Lifecycle of the device feeding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// No attach seen yet; samples are still accepted
    Pending,
    Attached,
    Detached,
    /// SDK reported an error; the frame stays silent until re-attach
    Faulted,
}

impl DeviceState {
    /// Whether processors may emit from this frame
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Attached)
    }
}

/// Received/sent bookkeeping
///
/// Counters rather than timestamps decide freshness so two samples in the
/// same clock tick are never confused.
#[derive(Debug, Default, Clone)]
struct SampleClock {
    received: u64,
    sent_mark: u64,
    last_received: Option<Instant>,
    last_sent: Option<Instant>,
}

impl SampleClock {
    fn record_received(&mut self) {
        self.received += 1;
        self.last_received = Some(Instant::now());
    }

    fn has_unsent(&self) -> bool {
        self.received > self.sent_mark
    }

    fn mark_sent(&mut self) {
        self.sent_mark = self.received;
        self.last_sent = Some(Instant::now());
    }
}

/// Binding and lifecycle shared by both frame kinds
#[derive(Debug, Clone)]
struct Binding {
    serial: Option<DeviceSerial>,
    state: DeviceState,
}

impl Binding {
    fn new() -> Self {
        Self {
            serial: None,
            state: DeviceState::Pending,
        }
    }

    fn attach(&mut self, serial: DeviceSerial) {
        self.serial = Some(serial);
        self.state = DeviceState::Attached;
    }
}

macro_rules! impl_frame_lifecycle {
    ($frame:ty) => {
        impl $frame {
            /// Serial of the bound device, if any
            #[inline]
            pub fn serial(&self) -> Option<DeviceSerial> {
                self.binding.serial
            }

            #[inline]
            pub fn state(&self) -> DeviceState {
                self.binding.state
            }

            /// Whether processors may emit from this frame
            #[inline]
            pub fn is_active(&self) -> bool {
                self.binding.state.is_active()
            }

            /// Bind to a device and mark it attached
            pub fn mark_attached(&mut self, serial: DeviceSerial) {
                self.binding.attach(serial);
            }

            pub fn mark_detached(&mut self) {
                self.binding.state = DeviceState::Detached;
            }

            pub fn mark_faulted(&mut self) {
                self.binding.state = DeviceState::Faulted;
            }

            /// Total samples ingested since construction
            #[inline]
            pub fn samples_received(&self) -> u64 {
                self.clock.received
            }

            /// Whether a sample arrived after the last send
            #[inline]
            pub fn has_unsent_samples(&self) -> bool {
                self.clock.has_unsent()
            }

            /// Record that the current contents have been emitted
            pub fn mark_sent(&mut self) {
                self.clock.mark_sent();
            }

            pub fn last_received(&self) -> Option<Instant> {
                self.clock.last_received
            }

            pub fn last_sent(&self) -> Option<Instant> {
                self.clock.last_sent
            }
        }
    };
}

/// Accelerometer frame
#[derive(Debug)]
pub struct TiltFrame {
    /// Indexed by raw axis
    axes: [AxisChannel; TILT_AXES],
    orientation: Orientation,
    binding: Binding,
    clock: SampleClock,
}

impl_frame_lifecycle!(TiltFrame);

impl TiltFrame {
    /// Create an empty frame with the given window capacity and orientation
    pub fn new(capacity: std::num::NonZeroUsize, orientation: Orientation) -> Self {
        let signs = orientation.accelerometer_signs();
        Self {
            axes: signs.map(|sign| AxisChannel::absolute(capacity, sign)),
            orientation,
            binding: Binding::new(),
            clock: SampleClock::default(),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::new(config.tilt_capacity()?, config.orientation()))
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Ingest one three-axis reading `[x, y, z]` in g
    pub fn ingest(&mut self, values: [f64; TILT_AXES]) {
        for (axis, value) in self.axes.iter_mut().zip(values) {
            axis.ingest(value);
        }
        self.clock.record_received();
    }

    /// Ingest a single raw axis reading
    pub fn ingest_axis(&mut self, index: usize, value: f64) -> Result<(), EngineError> {
        let axis = self.axes.get_mut(index).ok_or(EngineError::InvalidAxis {
            index,
            axes: TILT_AXES,
        })?;
        axis.ingest(value);
        self.clock.record_received();
        Ok(())
    }

    /// Empty every window so the next sample becomes the new level
    ///
    /// Sent bookkeeping is kept: leveling does not create a fresh sample.
    pub fn level_table(&mut self) {
        for axis in &mut self.axes {
            axis.level();
        }
        info!(serial = ?self.binding.serial, "tilt frame leveled");
    }

    /// Override the zero point of every raw axis
    pub fn set_zeros(&mut self, zeros: [f64; TILT_AXES]) {
        for (axis, zero) in self.axes.iter_mut().zip(zeros) {
            axis.set_zero(zero);
        }
        debug!(?zeros, "tilt zero points set");
    }

    /// Override the zero point of one raw axis
    pub fn set_zero(&mut self, index: usize, zero: f64) -> Result<(), EngineError> {
        let axis = self.axes.get_mut(index).ok_or(EngineError::InvalidAxis {
            index,
            axes: TILT_AXES,
        })?;
        axis.set_zero(zero);
        Ok(())
    }

    /// Zero points per raw axis
    pub fn zeros(&self) -> [f64; TILT_AXES] {
        [self.axes[0].zero(), self.axes[1].zero(), self.axes[2].zero()]
    }

    /// Channel feeding a logical output axis (0 = X, 1 = Y, 2 = Z)
    pub fn logical_axis(&self, logical: usize) -> Option<&AxisChannel> {
        let source = *self.orientation.source_axes().get(logical)?;
        self.axes.get(source)
    }

    /// Channel of a raw axis, ignoring the swap
    pub fn raw_axis(&self, index: usize) -> Option<&AxisChannel> {
        self.axes.get(index)
    }

    #[inline]
    pub fn x(&self) -> &AxisChannel {
        &self.axes[self.orientation.source_axes()[0]]
    }

    #[inline]
    pub fn y(&self) -> &AxisChannel {
        &self.axes[self.orientation.source_axes()[1]]
    }

    #[inline]
    pub fn z(&self) -> &AxisChannel {
        &self.axes[2]
    }

    /// Most recent normalized reading in logical axis order
    pub fn latest(&self) -> [f64; TILT_AXES] {
        [self.x().latest(), self.y().latest(), self.z().latest()]
    }

    /// Mean of the logical X and Y windows, `None` before the first sample
    pub fn mean_xy(&self) -> Option<(f64, f64)> {
        Some((self.x().mean()?, self.y().mean()?))
    }
}

/// Rotary encoder frame
#[derive(Debug)]
pub struct SpinFrame {
    channel: AxisChannel,
    binding: Binding,
    clock: SampleClock,
}

impl_frame_lifecycle!(SpinFrame);

impl SpinFrame {
    /// Create an empty frame; `sign` is the spin direction (flip_z)
    pub fn new(capacity: std::num::NonZeroUsize, sign: f64) -> Self {
        Self {
            channel: AxisChannel::relative(capacity, sign),
            binding: Binding::new(),
            clock: SampleClock::default(),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::new(
            config.spin_capacity()?,
            config.orientation().sign_z,
        ))
    }

    /// Ingest one position change reported by the encoder
    pub fn ingest(&mut self, position_change: f64) {
        self.channel.ingest(position_change);
        self.clock.record_received();
    }

    /// Most recent signed position change
    #[inline]
    pub fn latest_change(&self) -> f64 {
        self.channel.latest()
    }

    #[inline]
    pub fn channel(&self) -> &AxisChannel {
        &self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn swapped_orientation() -> Orientation {
        Orientation {
            sign_x: 1.0,
            sign_y: -1.0,
            sign_z: -1.0,
            swap_xy: true,
        }
    }

    #[test]
    fn test_swap_routes_raw_axes_with_their_signs() {
        let mut frame = TiltFrame::new(capacity(2), swapped_orientation());
        frame.ingest([0.0, 0.0, 0.0]);
        frame.ingest([2.0, 5.0, 1.0]);
        assert_eq!(frame.latest(), [-5.0, 2.0, 1.0]);
    }

    #[test]
    fn test_first_ingest_is_level() {
        let mut frame = TiltFrame::new(capacity(3), Orientation::IDENTITY);
        frame.ingest([0.1, -0.2, 0.98]);
        assert_eq!(frame.latest(), [0.0, 0.0, 0.0]);
        assert_eq!(frame.zeros(), [0.1, -0.2, 0.98]);
    }

    #[test]
    fn test_level_table_is_idempotent() {
        let mut frame = TiltFrame::new(capacity(3), Orientation::IDENTITY);
        frame.ingest([0.0, 0.0, 1.0]);
        frame.ingest([0.3, 0.1, 1.0]);

        frame.level_table();
        frame.level_table();
        assert!(frame.x().raw().is_empty());
        assert_eq!(frame.mean_xy(), None);

        frame.ingest([0.3, 0.1, 1.0]);
        assert_eq!(frame.latest(), [0.0, 0.0, 0.0]);
        assert_eq!(frame.zeros(), [0.3, 0.1, 1.0]);
    }

    #[test]
    fn test_ingest_axis_rejects_out_of_range() {
        let mut frame = TiltFrame::new(capacity(1), Orientation::IDENTITY);
        assert!(frame.ingest_axis(1, 0.4).is_ok());
        let err = frame.ingest_axis(3, 0.4).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAxis { index: 3, axes: 3 }));
        assert_eq!(frame.samples_received(), 1);
    }

    #[test]
    fn test_unsent_tracking_follows_counters() {
        let mut frame = SpinFrame::new(capacity(1), 1.0);
        assert!(!frame.has_unsent_samples());
        frame.ingest(2.0);
        assert!(frame.has_unsent_samples());
        frame.mark_sent();
        assert!(!frame.has_unsent_samples());
        assert!(frame.last_sent() >= frame.last_received());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut frame = SpinFrame::new(capacity(1), -1.0);
        assert_eq!(frame.state(), DeviceState::Pending);
        assert!(frame.is_active());

        frame.mark_attached(DeviceSerial::new(42));
        assert_eq!(frame.serial(), Some(DeviceSerial::new(42)));
        frame.mark_faulted();
        assert!(!frame.is_active());
        frame.mark_attached(DeviceSerial::new(42));
        frame.mark_detached();
        assert_eq!(frame.state(), DeviceState::Detached);
    }

    #[test]
    fn test_from_config_rejects_zero_capacity() {
        let config = GestureConfig {
            encoder_queue_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            SpinFrame::from_config(&config),
            Err(EngineError::Config(_))
        ));
        assert!(SpinFrame::from_config(&GestureConfig::default()).is_ok());
    }

    #[test]
    fn test_from_config_rejects_zero_flip() {
        let config = GestureConfig {
            flip_x: 0,
            ..Default::default()
        };
        let err = TiltFrame::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("gesture.flip_x"), "got: {err}");

        let config = GestureConfig {
            flip_z: 3,
            ..Default::default()
        };
        assert!(matches!(
            SpinFrame::from_config(&config),
            Err(EngineError::Config(_))
        ));
    }
}
