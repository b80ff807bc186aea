//! Device events - Hardware SDK callback surface
//!
//! The SDK invokes callbacks on its own threads; each callback is turned into
//! a `DeviceEvent` carrying the serial number used to demultiplex it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware serial number.
///
/// Serials are assigned by the device vendor and identify one physical board.
///
/// # Examples
/// ```
/// use contracts::DeviceSerial;
///
/// let serial = DeviceSerial::new(596_113);
/// assert_eq!(serial.get(), 596_113);
/// assert_eq!(serial.to_string(), "596113");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSerial(i32);

impl DeviceSerial {
    #[inline]
    pub const fn new(serial: i32) -> Self {
        Self(serial)
    }

    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for DeviceSerial {
    #[inline]
    fn from(serial: i32) -> Self {
        Self(serial)
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Device type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// 3-axis accelerometer driving tilt
    Accelerometer,
    /// Rotary encoder driving spin
    Encoder,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accelerometer => "accelerometer",
            Self::Encoder => "encoder",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One hardware SDK callback
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// Device opened and ready
    Attached { serial: DeviceSerial, kind: DeviceKind },

    /// Device unplugged or connection reset
    Detached { serial: DeviceSerial },

    /// SDK error callback; serial is absent when the SDK cannot tell
    Error {
        serial: Option<DeviceSerial>,
        code: i32,
        description: String,
    },

    /// Combined 3-axis acceleration frame
    Acceleration {
        serial: DeviceSerial,
        values: [f64; 3],
        timestamp: f64,
    },

    /// Single-axis streaming sample
    AxisSample {
        serial: DeviceSerial,
        index: usize,
        value: f64,
        timestamp: f64,
    },

    /// Encoder position change since the previous report
    PositionChange {
        serial: DeviceSerial,
        position_change: f64,
        time_change: f64,
    },
}

impl DeviceEvent {
    /// Serial carried by this event, if any
    pub fn serial(&self) -> Option<DeviceSerial> {
        match self {
            Self::Attached { serial, .. }
            | Self::Detached { serial }
            | Self::Acceleration { serial, .. }
            | Self::AxisSample { serial, .. }
            | Self::PositionChange { serial, .. } => Some(*serial),
            Self::Error { serial, .. } => *serial,
        }
    }

    /// Whether this event carries sensor data (as opposed to lifecycle)
    pub fn is_sample(&self) -> bool {
        matches!(
            self,
            Self::Acceleration { .. } | Self::AxisSample { .. } | Self::PositionChange { .. }
        )
    }
}
