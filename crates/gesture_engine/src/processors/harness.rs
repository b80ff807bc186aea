//! Scripted processor for exercising a client without hardware.
//!
//! Owns private tilt and spin frames and feeds them one scripted input per
//! `run()`, cycling through the script forever. Output goes through the
//! same tilt/spin decision logic as the real processors.

use contracts::{GestureConfig, GestureMessage, GestureProcessor};
use tracing::debug;

use super::{SpinGestureProcessor, TiltGestureProcessor};
use crate::error::EngineError;
use crate::frame::{SpinFrame, TiltFrame};
use crate::shared::FrameHandle;

/// One scripted step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HarnessInput {
    /// Accelerometer reading `[x, y, z]` in g
    Tilt([f64; 3]),
    /// Encoder position change
    Spin(f64),
    /// No input this tick
    Idle,
}

/// Level, sweep X and Y out and back, then spin both ways
pub fn default_script() -> Vec<HarnessInput> {
    let mut script = vec![HarnessInput::Tilt([0.0, 0.0, 1.0]), HarnessInput::Idle];

    let ramp: Vec<f64> = (1..=8)
        .chain((0..8).rev())
        .map(|step| 0.01 * step as f64)
        .collect();
    script.extend(ramp.iter().map(|&a| HarnessInput::Tilt([a, 0.0, 1.0])));
    script.extend(ramp.iter().map(|&a| HarnessInput::Tilt([0.0, -a, 1.0])));

    script.extend(std::iter::repeat_n(HarnessInput::Spin(1.0), 5));
    script.extend(std::iter::repeat_n(HarnessInput::Spin(-1.0), 5));
    script.push(HarnessInput::Idle);
    script
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    Tilt,
    Spin,
}

/// Cycles a fixed script through private frames
#[derive(Debug)]
pub struct TestHarnessGestureProcessor {
    tilt: TiltGestureProcessor,
    spin: SpinGestureProcessor,
    script: Vec<HarnessInput>,
    cursor: usize,
    pending: Option<Pending>,
    last_action: Option<GestureMessage>,
}

impl TestHarnessGestureProcessor {
    pub fn new(config: &GestureConfig, script: Vec<HarnessInput>) -> Result<Self, EngineError> {
        let tilt_frame = FrameHandle::new(TiltFrame::from_config(config)?);
        let spin_frame = FrameHandle::new(SpinFrame::from_config(config)?);
        debug!(steps = script.len(), "test harness script loaded");
        Ok(Self {
            tilt: TiltGestureProcessor::from_config(tilt_frame, config)?,
            spin: SpinGestureProcessor::new(spin_frame),
            script,
            cursor: 0,
            pending: None,
            last_action: None,
        })
    }

    /// Harness running the built-in script
    pub fn with_default_script(config: &GestureConfig) -> Result<Self, EngineError> {
        Self::new(config, default_script())
    }

    /// Index of the next scripted step
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn feed(&mut self, input: HarnessInput) {
        match input {
            HarnessInput::Tilt(values) => self.tilt.frame().lock().ingest(values),
            HarnessInput::Spin(change) => self.spin.frame().lock().ingest(change),
            HarnessInput::Idle => {}
        }
    }
}

impl GestureProcessor for TestHarnessGestureProcessor {
    fn name(&self) -> &str {
        "test_harness"
    }

    fn run(&mut self) -> bool {
        let Some(&input) = self.script.get(self.cursor) else {
            return false;
        };
        self.cursor = (self.cursor + 1) % self.script.len();
        self.feed(input);

        self.pending = if self.tilt.run() {
            Some(Pending::Tilt)
        } else if self.spin.run() {
            Some(Pending::Spin)
        } else {
            None
        };
        self.pending.is_some()
    }

    fn next_action(&mut self) -> Option<GestureMessage> {
        let action = match self.pending.take()? {
            Pending::Tilt => self.tilt.next_action(),
            Pending::Spin => self.spin.next_action(),
        }?;
        self.last_action = Some(action);
        Some(action)
    }

    fn last_action(&self) -> Option<&GestureMessage> {
        self.last_action.as_ref()
    }
}
