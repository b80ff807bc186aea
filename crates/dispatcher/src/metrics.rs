//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

use contracts::GestureKind;

/// Counters updated by the dispatch loop
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    ticks: AtomicU64,
    pans_sent: AtomicU64,
    zooms_sent: AtomicU64,
    send_failures: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn inc_ticks(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one gesture handed to the outbound channel
    pub fn inc_sent(&self, kind: GestureKind) {
        let counter = match kind {
            GestureKind::Pan => &self.pans_sent,
            GestureKind::Zoom => &self.zooms_sent,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self) -> u64 {
        self.pans_sent.load(Ordering::Relaxed) + self.zooms_sent.load(Ordering::Relaxed)
    }

    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchMetricsSnapshot {
        DispatchMetricsSnapshot {
            ticks: self.ticks(),
            pans_sent: self.pans_sent.load(Ordering::Relaxed),
            zooms_sent: self.zooms_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchMetricsSnapshot {
    pub ticks: u64,
    pub pans_sent: u64,
    pub zooms_sent: u64,
    pub send_failures: u64,
}

impl DispatchMetricsSnapshot {
    pub fn gestures_sent(&self) -> u64 {
        self.pans_sent + self.zooms_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sent_by_kind() {
        let metrics = DispatchMetrics::new();
        metrics.inc_sent(GestureKind::Pan);
        metrics.inc_sent(GestureKind::Pan);
        metrics.inc_sent(GestureKind::Zoom);
        metrics.inc_ticks();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pans_sent, 2);
        assert_eq!(snapshot.zooms_sent, 1);
        assert_eq!(snapshot.gestures_sent(), metrics.sent());
        assert_eq!(snapshot.ticks, 1);
    }
}
