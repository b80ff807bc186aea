//! Gesture pipeline metrics
//!
//! Thin wrappers over the `metrics` macros so metric names and labels are
//! defined in one place, plus in-memory statistics for the end-of-session
//! summary.

use std::time::Duration;

use contracts::{DeviceKind, GestureKind};
use metrics::{counter, gauge, histogram};

/// Record one sample accepted into a frame
pub fn record_sample_ingested(kind: DeviceKind) {
    counter!("tilty_samples_ingested_total", "device" => kind.as_str()).increment(1);
}

/// Record a callback dropped because its serial is not registered
pub fn record_unknown_device() {
    counter!("tilty_unknown_device_drops_total").increment(1);
}

/// Record an SDK error callback
pub fn record_device_fault(code: i32) {
    counter!("tilty_device_faults_total", "code" => code.to_string()).increment(1);
}

/// Record attach (true) or detach (false) of a device
pub fn record_device_attached(kind: DeviceKind, attached: bool) {
    gauge!("tilty_device_attached", "device" => kind.as_str()).set(if attached { 1.0 } else { 0.0 });
}

/// Record a gesture handed to the outbound channel
pub fn record_gesture_sent(channel: &str, gesture: GestureKind) {
    counter!(
        "tilty_gestures_sent_total",
        "channel" => channel.to_string(),
        "gesture" => gesture.as_str()
    )
    .increment(1);
}

/// Record a failed send (ends the session)
pub fn record_send_failure(channel: &str) {
    counter!("tilty_send_failures_total", "channel" => channel.to_string()).increment(1);
}

/// Record one dispatch tick
pub fn record_tick() {
    counter!("tilty_dispatch_ticks_total").increment(1);
}

/// Record the processing time of one tick, excluding the sleep
pub fn record_tick_duration_ms(duration_ms: f64) {
    histogram!("tilty_dispatch_tick_duration_ms").record(duration_ms);
}

/// Record why a dispatch session ended
pub fn record_session_end(reason: &'static str) {
    counter!("tilty_sessions_ended_total", "reason" => reason).increment(1);
}

/// Online mean/variance (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Frozen view of a `RunningStats`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// End-of-session report
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub duration: Duration,
    pub end_reason: String,
    pub ticks: u64,
    pub pans_sent: u64,
    pub zooms_sent: u64,
    pub send_failures: u64,
    pub samples_ingested: u64,
    pub unknown_device_drops: u64,
    pub device_faults: u64,
    pub tick_duration_ms: StatsSummary,
}

impl SessionSummary {
    pub fn gestures_sent(&self) -> u64 {
        self.pans_sent + self.zooms_sent
    }
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Summary ===")?;
        writeln!(f, "Ended: {}", self.end_reason)?;
        writeln!(f, "Duration: {:.2}s", self.duration.as_secs_f64())?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(
            f,
            "Gestures sent: {} (pan {}, zoom {})",
            self.gestures_sent(),
            self.pans_sent,
            self.zooms_sent
        )?;
        writeln!(f, "Send failures: {}", self.send_failures)?;
        writeln!(f, "Samples ingested: {}", self.samples_ingested)?;
        writeln!(f, "Unknown-device drops: {}", self.unknown_device_drops)?;
        writeln!(f, "Device faults: {}", self.device_faults)?;
        writeln!(f, "Tick duration (ms): {}", self.tick_duration_ms)?;
        Ok(())
    }
}
