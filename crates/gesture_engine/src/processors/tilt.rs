//! Tilt → pan

use contracts::{GestureConfig, GestureMessage, GestureProcessor};
use tracing::trace;

use crate::error::EngineError;
use crate::frame::TiltFrame;
use crate::shared::FrameHandle;

/// Emits `pan` while the table is tilted past the threshold
///
/// An axis whose window mean is within `threshold` of level contributes 0;
/// nothing is emitted when both axes are suppressed.
#[derive(Debug)]
pub struct TiltGestureProcessor {
    frame: FrameHandle<TiltFrame>,
    threshold: f64,
    last_action: Option<GestureMessage>,
}

impl TiltGestureProcessor {
    pub fn new(frame: FrameHandle<TiltFrame>, threshold: f64) -> Self {
        Self {
            frame,
            threshold,
            last_action: None,
        }
    }

    /// Processor using the configured threshold; rejects an invalid config
    pub fn from_config(
        frame: FrameHandle<TiltFrame>,
        config: &GestureConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::new(frame, config.tilt_threshold))
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn frame(&self) -> &FrameHandle<TiltFrame> {
        &self.frame
    }

    /// Pan vector for the frame's current windows, if any axis is tilted
    fn decide(frame: &TiltFrame, threshold: f64) -> Option<GestureMessage> {
        let (mean_x, mean_y) = frame.mean_xy()?;
        let tilted_x = mean_x.abs() > threshold;
        let tilted_y = mean_y.abs() > threshold;
        if !tilted_x && !tilted_y {
            return None;
        }
        Some(GestureMessage::pan(
            if tilted_x { mean_x } else { 0.0 },
            if tilted_y { mean_y } else { 0.0 },
        ))
    }
}

impl GestureProcessor for TiltGestureProcessor {
    fn name(&self) -> &str {
        "tilt"
    }

    fn run(&mut self) -> bool {
        let frame = self.frame.lock();
        frame.is_active()
            && frame.has_unsent_samples()
            && Self::decide(&frame, self.threshold).is_some()
    }

    fn next_action(&mut self) -> Option<GestureMessage> {
        let mut frame = self.frame.lock();
        let action = Self::decide(&frame, self.threshold)?;
        frame.mark_sent();
        drop(frame);

        trace!(?action, "tilt action");
        self.last_action = Some(action);
        Some(action)
    }

    fn last_action(&self) -> Option<&GestureMessage> {
        self.last_action.as_ref()
    }
}
