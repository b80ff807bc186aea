//! Spin → zoom

use contracts::{GestureMessage, GestureProcessor};
use tracing::trace;

use crate::frame::SpinFrame;
use crate::shared::FrameHandle;

/// Emits `zoom` with the most recent signed encoder change
///
/// Runs whenever the encoder reported since the last send, including a
/// change of 0.
#[derive(Debug)]
pub struct SpinGestureProcessor {
    frame: FrameHandle<SpinFrame>,
    last_action: Option<GestureMessage>,
}

impl SpinGestureProcessor {
    pub fn new(frame: FrameHandle<SpinFrame>) -> Self {
        Self {
            frame,
            last_action: None,
        }
    }

    pub fn frame(&self) -> &FrameHandle<SpinFrame> {
        &self.frame
    }
}

impl GestureProcessor for SpinGestureProcessor {
    fn name(&self) -> &str {
        "spin"
    }

    fn run(&mut self) -> bool {
        let frame = self.frame.lock();
        frame.is_active() && frame.has_unsent_samples()
    }

    fn next_action(&mut self) -> Option<GestureMessage> {
        let mut frame = self.frame.lock();
        if frame.samples_received() == 0 {
            return None;
        }
        let action = GestureMessage::zoom(frame.latest_change());
        frame.mark_sent();
        drop(frame);

        trace!(?action, "spin action");
        self.last_action = Some(action);
        Some(action)
    }

    fn last_action(&self) -> Option<&GestureMessage> {
        self.last_action.as_ref()
    }
}
