//! ServerConfig - Config Loader output
//!
//! Immutable server configuration: gesture tuning, device binding and the
//! outbound channel. Built once at startup and passed by reference.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ContractError, DeviceSerial};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete server configuration
///
/// Every section has defaults, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Smoothing, thresholds and orientation
    #[serde(default)]
    pub gesture: GestureConfig,

    /// Hardware device binding
    #[serde(default)]
    pub devices: DevicesConfig,

    /// Where gesture messages go
    #[serde(default)]
    pub outbound: OutboundConfig,
}

/// Gesture pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Accelerometer window capacity (samples averaged per axis)
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Encoder window capacity
    #[serde(default = "default_encoder_queue_length")]
    pub encoder_queue_length: usize,

    /// Seconds between dispatch ticks
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Minimum mean deflection from level to register as tilt
    #[serde(default = "default_tilt_threshold")]
    pub tilt_threshold: f64,

    /// Sign of the left-right axis, +1 or -1
    #[serde(default = "default_flip_x")]
    pub flip_x: i8,

    /// Sign of the near-far axis, +1 or -1
    #[serde(default = "default_flip_y")]
    pub flip_y: i8,

    /// Sign of the spin direction on zoom, +1 or -1
    #[serde(default = "default_flip_z")]
    pub flip_z: i8,

    /// Sensor mounted rotated by 90°: X output reads the Y axis and vice versa
    #[serde(default)]
    pub swap_xy: bool,

    /// Add the scripted test-harness processor to the dispatch loop
    #[serde(default)]
    pub test_harness: bool,
}

fn default_queue_length() -> usize {
    10
}

fn default_encoder_queue_length() -> usize {
    1
}

fn default_sample_rate() -> f64 {
    0.1
}

fn default_tilt_threshold() -> f64 {
    0.002
}

fn default_flip_x() -> i8 {
    1
}

fn default_flip_y() -> i8 {
    -1
}

fn default_flip_z() -> i8 {
    -1
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            queue_length: default_queue_length(),
            encoder_queue_length: default_encoder_queue_length(),
            sample_rate: default_sample_rate(),
            tilt_threshold: default_tilt_threshold(),
            flip_x: default_flip_x(),
            flip_y: default_flip_y(),
            flip_z: default_flip_z(),
            swap_xy: false,
            test_harness: false,
        }
    }
}

impl GestureConfig {
    /// Accelerometer window capacity as a non-zero count
    pub fn tilt_capacity(&self) -> Result<NonZeroUsize, ContractError> {
        NonZeroUsize::new(self.queue_length).ok_or_else(|| {
            ContractError::config_validation("gesture.queue_length", "queue_length must be >= 1")
        })
    }

    /// Encoder window capacity as a non-zero count
    pub fn spin_capacity(&self) -> Result<NonZeroUsize, ContractError> {
        NonZeroUsize::new(self.encoder_queue_length).ok_or_else(|| {
            ContractError::config_validation(
                "gesture.encoder_queue_length",
                "encoder_queue_length must be >= 1",
            )
        })
    }

    /// Interval between dispatch ticks
    pub fn sample_interval(&self) -> Result<Duration, ContractError> {
        if self.sample_rate <= 0.0 {
            return Err(ContractError::config_validation(
                "gesture.sample_rate",
                format!("sample_rate must be > 0, got {}", self.sample_rate),
            ));
        }
        Duration::try_from_secs_f64(self.sample_rate)
            .map_err(|e| ContractError::config_validation("gesture.sample_rate", e.to_string()))
    }

    /// Check every gesture setting; the first violation wins
    ///
    /// Shared by the config loader and the frame and processor constructors.
    pub fn validate(&self) -> Result<(), ContractError> {
        self.tilt_capacity()?;
        self.spin_capacity()?;

        if !self.sample_rate.is_finite() {
            return Err(ContractError::config_validation(
                "gesture.sample_rate",
                format!("sample_rate must be finite, got {}", self.sample_rate),
            ));
        }
        self.sample_interval()?;

        let threshold = self.tilt_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ContractError::config_validation(
                "gesture.tilt_threshold",
                format!("tilt_threshold must be finite and >= 0, got {threshold}"),
            ));
        }

        let flips = [
            ("gesture.flip_x", self.flip_x),
            ("gesture.flip_y", self.flip_y),
            ("gesture.flip_z", self.flip_z),
        ];
        for (field, flip) in flips {
            if flip != 1 && flip != -1 {
                return Err(ContractError::config_validation(
                    field,
                    format!("flip must be 1 or -1, got {flip}"),
                ));
            }
        }
        Ok(())
    }

    /// Orientation derived from the flip/swap settings
    pub fn orientation(&self) -> Orientation {
        Orientation {
            sign_x: f64::from(self.flip_x),
            sign_y: f64::from(self.flip_y),
            sign_z: f64::from(self.flip_z),
            swap_xy: self.swap_xy,
        }
    }
}

/// Mounting orientation of the physical sensors
///
/// Signs belong to the raw axes and travel with them through a swap.
/// Fixed at frame construction; changing it means rebuilding the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// Sign applied to the raw X axis
    pub sign_x: f64,
    /// Sign applied to the raw Y axis
    pub sign_y: f64,
    /// Encoder direction for spin; the accelerometer Z axis is never flipped
    pub sign_z: f64,
    /// X output reads the raw Y axis and Y output reads the raw X axis
    pub swap_xy: bool,
}

impl Orientation {
    /// No flips, no swap
    pub const IDENTITY: Orientation = Orientation {
        sign_x: 1.0,
        sign_y: 1.0,
        sign_z: 1.0,
        swap_xy: false,
    };

    /// Raw axis index feeding each logical output axis
    pub fn source_axes(&self) -> [usize; 3] {
        if self.swap_xy {
            [1, 0, 2]
        } else {
            [0, 1, 2]
        }
    }

    /// Signs per raw accelerometer axis
    pub fn accelerometer_signs(&self) -> [f64; 3] {
        [self.sign_x, self.sign_y, 1.0]
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hardware device binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevicesConfig {
    /// Serial of the accelerometer; when unset the first attaching one is bound
    #[serde(default)]
    pub accelerometer_serial: Option<DeviceSerial>,

    /// Serial of the rotary encoder; when unset the first attaching one is bound
    #[serde(default)]
    pub encoder_serial: Option<DeviceSerial>,

    /// How long a session waits for the accelerometer to attach
    #[serde(default = "default_attach_timeout_ms")]
    pub attach_timeout_ms: u64,

    /// Re-zero the tilt frame when a session starts
    #[serde(default = "default_level_on_session_start")]
    pub level_on_session_start: bool,
}

fn default_attach_timeout_ms() -> u64 {
    5000
}

fn default_level_on_session_start() -> bool {
    true
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            accelerometer_serial: None,
            encoder_serial: None,
            attach_timeout_ms: default_attach_timeout_ms(),
            level_on_session_start: default_level_on_session_start(),
        }
    }
}

impl DevicesConfig {
    /// Attach wait as a duration
    pub fn attach_timeout(&self) -> Duration {
        Duration::from_millis(self.attach_timeout_ms)
    }
}

/// Outbound channel configuration
///
/// Outbound channels hold at most the latest pending pan and zoom, so there
/// is no queue to size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutboundConfig {
    /// Channel type
    #[serde(default)]
    pub kind: OutboundKind,
}

/// Outbound channel type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
    /// Log every message through tracing
    #[default]
    Log,
    /// JSON lines on stdout, for piping into a transport process
    Stdout,
}
