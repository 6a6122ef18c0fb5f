//! Rolling detector latency statistics.

use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of detector processing times
#[derive(Debug, Clone)]
pub struct DetectionStats {
    window_size: usize,
    latencies_ms: VecDeque<f64>,
    completed: u64,
    failures: u64,
}

impl DetectionStats {
    /// Create a new statistics window
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            latencies_ms: VecDeque::with_capacity(window_size),
            completed: 0,
            failures: 0,
        }
    }

    /// Record one finished detection and its latency
    pub fn record(&mut self, latency: Duration, failed: bool) {
        if self.window_size == 0 {
            return;
        }
        if self.latencies_ms.len() >= self.window_size {
            self.latencies_ms.pop_front();
        }
        self.latencies_ms.push_back(latency.as_secs_f64() * 1000.0);

        self.completed += 1;
        if failed {
            self.failures += 1;
        }
    }

    /// Get current summary, `None` until at least one detection finished
    #[must_use]
    pub fn summary(&self) -> Option<LatencySummary> {
        if self.latencies_ms.is_empty() {
            return None;
        }

        let n = self.latencies_ms.len() as f64;
        let mean_ms = self.latencies_ms.iter().sum::<f64>() / n;
        let max_ms = self.latencies_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(LatencySummary {
            mean_ms,
            max_ms,
            detections_per_second: if mean_ms > 0.0 { 1000.0 / mean_ms } else { f64::INFINITY },
            completed: self.completed,
            failures: self.failures,
        })
    }

    /// Reset the window
    pub fn reset(&mut self) {
        self.latencies_ms.clear();
        self.completed = 0;
        self.failures = 0;
    }
}

/// Summary of the latency window
#[derive(Debug, Clone, Copy)]
pub struct LatencySummary {
    /// Mean latency in milliseconds
    pub mean_ms: f64,
    /// Worst latency in the window
    pub max_ms: f64,
    /// Effective detector rate implied by the mean latency
    pub detections_per_second: f64,
    /// Detections finished since the last reset
    pub completed: u64,
    /// Of those, how many failed or found no face
    pub failures: u64,
}
