//! # Gesture Engine
//!
//! Smoothing windows, orientation-aware sensor frames and the gesture
//! processors that turn them into pan/zoom messages.
//!
//! Responsibilities:
//! - Fixed-capacity sliding windows of raw values and deltas
//! - Zero-point calibration, sign flips and the X/Y swap
//! - Tilt / spin / test-harness `GestureProcessor` implementations
//!
//! ## Example
//!
//! ```
//! use contracts::{GestureConfig, GestureProcessor};
//! use gesture_engine::{FrameHandle, TiltFrame, TiltGestureProcessor};
//!
//! let config = GestureConfig { queue_length: 1, ..Default::default() };
//! let frame = FrameHandle::new(TiltFrame::from_config(&config).unwrap());
//! let mut tilt = TiltGestureProcessor::from_config(frame.clone(), &config).unwrap();
//!
//! frame.lock().ingest([0.0, 0.0, 1.0]); // establishes the zero point
//! frame.lock().ingest([0.05, 0.0, 1.0]);
//!
//! assert!(tilt.run());
//! let message = tilt.next_action().unwrap();
//! assert_eq!(message.kind().as_str(), "pan");
//! ```

mod channel;
mod error;
mod frame;
mod processors;
mod shared;
mod window;

pub use channel::{round_to_resolution, AxisChannel, Calibration};
pub use error::EngineError;
pub use frame::{DeviceState, SpinFrame, TiltFrame, TILT_AXES};
pub use processors::{
    default_script, HarnessInput, SpinGestureProcessor, TestHarnessGestureProcessor,
    TiltGestureProcessor,
};
pub use shared::FrameHandle;
pub use window::SlidingWindow;
