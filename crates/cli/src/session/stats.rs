//! Session statistics.

use device_bridge::BridgeMetricsSnapshot;
use dispatcher::SessionEnd;
use observability::SessionSummary;

/// Statistics from one server session
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// How and when the dispatch loop ended
    pub end: SessionEnd,

    /// Device callback counters at session end
    pub bridge: BridgeMetricsSnapshot,
}

impl SessionStats {
    pub fn new(end: SessionEnd, bridge: BridgeMetricsSnapshot) -> Self {
        Self { end, bridge }
    }

    /// Gestures per second over the session
    pub fn gesture_rate(&self) -> f64 {
        let secs = self.end.duration.as_secs_f64();
        if secs > 0.0 {
            self.end.metrics.gestures_sent() as f64 / secs
        } else {
            0.0
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let metrics = &self.end.metrics;
        SessionSummary {
            duration: self.end.duration,
            end_reason: self.end.reason.to_string(),
            ticks: metrics.ticks,
            pans_sent: metrics.pans_sent,
            zooms_sent: metrics.zooms_sent,
            send_failures: metrics.send_failures,
            samples_ingested: self.bridge.samples_ingested,
            unknown_device_drops: self.bridge.unknown_device_drops,
            device_faults: self.bridge.device_faults,
            tick_duration_ms: self.end.tick_duration_ms.clone(),
        }
    }

    /// Print detailed summary to stderr; stdout may carry the gesture stream
    pub fn print_summary(&self) {
        eprintln!("\n{}", self.summary());
        eprintln!("Gesture rate: {:.2}/s", self.gesture_rate());
        eprintln!(
            "Device attaches: {}, detaches: {}, mismatched samples: {}",
            self.bridge.attaches, self.bridge.detaches, self.bridge.mismatched_samples
        );
        if let Some(ref error) = self.end.error {
            eprintln!("Last error: {}", error);
        }
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher::{DispatchMetricsSnapshot, EndReason};
    use observability::StatsSummary;
    use std::time::Duration;

    fn stats() -> SessionStats {
        SessionStats::new(
            SessionEnd {
                reason: EndReason::Disconnected,
                duration: Duration::from_secs(2),
                metrics: DispatchMetricsSnapshot {
                    ticks: 20,
                    pans_sent: 6,
                    zooms_sent: 2,
                    send_failures: 1,
                },
                tick_duration_ms: StatsSummary::default(),
                error: Some("outbound channel closed".to_string()),
            },
            BridgeMetricsSnapshot {
                samples_ingested: 120,
                unknown_device_drops: 3,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_summary_merges_dispatch_and_bridge_counters() {
        let summary = stats().summary();
        assert_eq!(summary.end_reason, "disconnected");
        assert_eq!(summary.gestures_sent(), 8);
        assert_eq!(summary.samples_ingested, 120);
        assert_eq!(summary.unknown_device_drops, 3);
    }

    #[test]
    fn test_gesture_rate_over_duration() {
        assert!((stats().gesture_rate() - 4.0).abs() < 1e-9);
    }
}
