//! In-process bridge counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Bridge counters, shared with the callback threads
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    samples_ingested: AtomicU64,
    unknown_device_drops: AtomicU64,
    /// Sample whose shape does not match the bound frame
    mismatched_samples: AtomicU64,
    device_faults: AtomicU64,
    attaches: AtomicU64,
    detaches: AtomicU64,
}

impl BridgeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ingested(&self) {
        self.samples_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_device(&self) {
        self.unknown_device_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mismatched(&self) {
        self.mismatched_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self) {
        self.device_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attach(&self) {
        self.attaches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detach(&self) {
        self.detaches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BridgeMetricsSnapshot {
        BridgeMetricsSnapshot {
            samples_ingested: self.samples_ingested.load(Ordering::Relaxed),
            unknown_device_drops: self.unknown_device_drops.load(Ordering::Relaxed),
            mismatched_samples: self.mismatched_samples.load(Ordering::Relaxed),
            device_faults: self.device_faults.load(Ordering::Relaxed),
            attaches: self.attaches.load(Ordering::Relaxed),
            detaches: self.detaches.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of bridge counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeMetricsSnapshot {
    pub samples_ingested: u64,
    pub unknown_device_drops: u64,
    pub mismatched_samples: u64,
    pub device_faults: u64,
    pub attaches: u64,
    pub detaches: u64,
}
