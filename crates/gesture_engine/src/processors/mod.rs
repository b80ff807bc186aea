//! `GestureProcessor` implementations

mod harness;
mod spin;
mod tilt;

pub use harness::{default_script, HarnessInput, TestHarnessGestureProcessor};
pub use spin::SpinGestureProcessor;
pub use tilt::TiltGestureProcessor;
