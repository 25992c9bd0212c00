use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Run counters shared by the directory, association and correction stages.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub towers_resolved: usize,
    pub cells_unresolved: usize,
    pub samples_associated: usize,
    pub samples_excluded: usize,
    pub latitude_corrections: usize,
    pub longitude_corrections: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_resolved(&self) {
        self.update(|m| m.towers_resolved += 1);
    }

    pub fn record_unresolved(&self) {
        self.update(|m| m.cells_unresolved += 1);
    }

    pub fn record_associated(&self, count: usize) {
        self.update(|m| m.samples_associated += count);
    }

    pub fn record_excluded(&self, count: usize) {
        self.update(|m| m.samples_excluded += count);
    }

    pub fn record_correction(&self, latitude: bool, longitude: bool) {
        self.update(|m| {
            m.latitude_corrections += latitude as usize;
            m.longitude_corrections += longitude as usize;
        });
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
