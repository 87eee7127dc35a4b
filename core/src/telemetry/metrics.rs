use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters describing how a session has been driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Perimeter/area recomputations after shape edits.
    pub recomputations: usize,
    /// Recomputed values that matched the stored value and were not written.
    pub suppressed_writes: usize,
    pub geocode_failures: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_recomputation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.recomputations += 1;
        }
    }

    pub fn record_suppressed_write(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.suppressed_writes += 1;
        }
    }

    pub fn record_geocode_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.geocode_failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
