//! Per-axis normalization: zero point, sign, 3-decimal rounding and the
//! paired raw/delta windows.

use std::num::NonZeroUsize;

use tracing::trace;

use crate::window::SlidingWindow;

/// How an axis establishes its zero point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    /// First sample after construction or a level becomes the zero point
    FirstSample,
    /// Values are already relative (encoder position changes); zero stays 0
    Relative,
}

/// Round to the 0.001 sensor resolution
///
/// Adding 0.0 folds -0.0 into 0.0 so a flipped zero serializes as `0.0`.
#[inline]
pub fn round_to_resolution(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0 + 0.0
}

/// One axis of a sensor frame
#[derive(Debug)]
pub struct AxisChannel {
    raw: SlidingWindow,
    deltas: SlidingWindow,
    zero: f64,
    sign: f64,
    calibration: Calibration,
}

impl AxisChannel {
    /// Accelerometer-style axis, zeroed on its first sample
    pub fn absolute(capacity: NonZeroUsize, sign: f64) -> Self {
        Self::with_calibration(capacity, sign, Calibration::FirstSample)
    }

    /// Encoder-style axis carrying relative values
    pub fn relative(capacity: NonZeroUsize, sign: f64) -> Self {
        Self::with_calibration(capacity, sign, Calibration::Relative)
    }

    fn with_calibration(capacity: NonZeroUsize, sign: f64, calibration: Calibration) -> Self {
        Self {
            raw: SlidingWindow::new(capacity),
            deltas: SlidingWindow::new(capacity),
            zero: 0.0,
            sign,
            calibration,
        }
    }

    /// Normalize and store one raw reading, returning the normalized value
    pub fn ingest(&mut self, raw_value: f64) -> f64 {
        if self.calibration == Calibration::FirstSample && self.raw.is_empty() {
            self.zero = raw_value;
            trace!(zero = raw_value, "axis zero point established");
        }

        let normalized = round_to_resolution(self.sign * (raw_value - self.zero));
        let delta = normalized - self.raw.head();
        self.deltas.enqueue(delta);
        self.raw.enqueue(normalized);
        normalized
    }

    /// Empty both windows so the next sample becomes the new zero point
    pub fn level(&mut self) {
        self.raw.clear();
        self.deltas.clear();
    }

    /// Override the zero point without touching the windows
    pub fn set_zero(&mut self, zero: f64) {
        self.zero = zero;
    }

    #[inline]
    pub fn zero(&self) -> f64 {
        self.zero
    }

    #[inline]
    pub fn sign(&self) -> f64 {
        self.sign
    }

    #[inline]
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Normalized values
    #[inline]
    pub fn raw(&self) -> &SlidingWindow {
        &self.raw
    }

    /// Differences between consecutive normalized values
    #[inline]
    pub fn deltas(&self) -> &SlidingWindow {
        &self.deltas
    }

    /// Mean of the normalized window
    #[inline]
    pub fn mean(&self) -> Option<f64> {
        self.raw.mean()
    }

    /// Most recent normalized value
    #[inline]
    pub fn latest(&self) -> f64 {
        self.raw.head()
    }

    /// Most recent delta
    #[inline]
    pub fn latest_delta(&self) -> f64 {
        self.deltas.head()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_first_sample_becomes_zero() {
        let mut axis = AxisChannel::absolute(capacity(4), -1.0);
        assert_eq!(axis.ingest(0.37), 0.0);
        assert_eq!(axis.zero(), 0.37);
        assert_eq!(axis.ingest(0.47), -0.1);
        assert_eq!(axis.latest_delta(), -0.1);
    }

    #[test]
    fn test_raw_and_delta_windows_track_together() {
        let mut axis = AxisChannel::absolute(capacity(3), 1.0);
        for v in [0.0, 1.0, 2.0, 3.0] {
            axis.ingest(v);
        }
        assert_eq!(axis.raw().values(), vec![3.0, 2.0, 1.0]);
        assert_eq!(axis.deltas().values(), vec![1.0, 1.0, 1.0]);
        assert_eq!(axis.mean(), Some(2.0));
    }

    #[test]
    fn test_values_are_rounded_to_resolution() {
        let mut axis = AxisChannel::absolute(capacity(2), 1.0);
        axis.ingest(0.0);
        assert_eq!(axis.ingest(0.12345), 0.123);
        assert_eq!(axis.ingest(-0.0004), 0.0);
    }

    #[test]
    fn test_level_rezeroes_on_next_sample() {
        let mut axis = AxisChannel::absolute(capacity(2), 1.0);
        axis.ingest(0.0);
        axis.ingest(0.5);
        axis.level();
        assert!(axis.raw().is_empty());
        assert!(axis.deltas().is_empty());

        assert_eq!(axis.ingest(0.5), 0.0);
        assert_eq!(axis.zero(), 0.5);
    }

    #[test]
    fn test_relative_axis_never_rezeroes() {
        let mut axis = AxisChannel::relative(capacity(1), -1.0);
        assert_eq!(axis.ingest(5.0), -5.0);
        assert_eq!(axis.ingest(-3.0), 3.0);
        assert_eq!(axis.zero(), 0.0);
        // -0.0 is folded to 0.0
        let zero = axis.ingest(0.0);
        assert!(zero.is_sign_positive());
    }

    #[test]
    fn test_set_zero_applies_to_following_samples() {
        let mut axis = AxisChannel::absolute(capacity(2), 1.0);
        axis.ingest(1.0);
        axis.set_zero(0.5);
        assert_eq!(axis.ingest(1.0), 0.5);
    }
}
