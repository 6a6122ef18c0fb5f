//! Frame-synchronised detection scheduling.
//!
//! The scheduler is ticked once per host frame. It issues at most one
//! detector call at a time as a spawned task, keeps the most recent good
//! [`EyeSample`] in a single slot, and on every tick reports the best sample
//! available: fresh, held over, or an explicit no-target.

use crate::{
    constants::{DEFAULT_FPS, DEFAULT_FRAME_SKIP, DETECTION_STATS_WINDOW, NO_TARGET_MISS_CYCLES},
    detection::{CaptureSource, EyeLandmarks, EyeSample, LandmarkDetector},
    stats::{DetectionStats, LatencySummary},
    Result,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Cadence and hold parameters for the detection loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Invoke the detector on every Nth tick; skipped ticks re-emit the held sample
    pub frame_skip: u32,
    /// Drop the held sample after this many consecutive missed cycles
    pub hold_limit: Option<u32>,
    /// Host repaint rate driving the loop
    pub target_fps: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_skip: DEFAULT_FRAME_SKIP,
            hold_limit: None,
            target_fps: DEFAULT_FPS,
        }
    }
}

/// What the scheduler reports for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    /// A detection completed this tick with a face
    Fresh(EyeSample),
    /// No fresh result this tick; the last known sample, unchanged
    Held(EyeSample),
    /// Nothing known yet and not enough misses to give up
    Pending,
    /// Tracking lost or stopped: recentre
    NoTarget,
    /// Scheduler is not running
    Idle,
}

impl Emission {
    /// Sample carried by this emission, fresh or held
    #[must_use]
    pub const fn sample(&self) -> Option<EyeSample> {
        match self {
            Self::Fresh(sample) | Self::Held(sample) => Some(*sample),
            _ => None,
        }
    }
}

type DetectionOutcome = (Result<Option<EyeLandmarks>>, Duration);

/// Detection loop state for one tracking session
pub struct DetectionScheduler {
    detector: Arc<dyn LandmarkDetector>,
    capture: Box<dyn CaptureSource>,
    config: SchedulerConfig,
    running: bool,
    in_flight: Option<JoinHandle<DetectionOutcome>>,
    last_sample: Option<EyeSample>,
    ticks_since_detection: u32,
    missed_cycles: u32,
    stats: DetectionStats,
}

impl DetectionScheduler {
    /// Create a scheduler around a detector and a capture source
    ///
    /// # Panics
    ///
    /// Panics if `frame_skip` is zero
    pub fn new(
        detector: Arc<dyn LandmarkDetector>,
        capture: Box<dyn CaptureSource>,
        config: SchedulerConfig,
    ) -> Self {
        assert!(config.frame_skip > 0, "Frame skip must be greater than 0");
        Self {
            detector,
            capture,
            config,
            running: false,
            in_flight: None,
            last_sample: None,
            ticks_since_detection: 0,
            missed_cycles: 0,
            stats: DetectionStats::new(DETECTION_STATS_WINDOW),
        }
    }

    /// Acquire the capture source and begin scheduling detections.
    ///
    /// # Errors
    ///
    /// Returns the capture error unchanged; there is no automatic retry
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }

        if let Err(e) = self.capture.start() {
            error!("Failed to start capture: {}", e);
            return Err(e);
        }

        info!(
            "Detection started with {} (frame skip {})",
            self.detector.name(),
            self.config.frame_skip
        );
        self.running = true;
        self.clear_cycle_state();
        self.stats.reset();
        Ok(())
    }

    /// Cancel any in-flight detection, release capture and report no target.
    ///
    /// Safe to call repeatedly.
    pub fn stop(&mut self) -> Emission {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        if self.running {
            self.capture.stop();
            info!("Detection stopped");
        }
        self.running = false;
        self.clear_cycle_state();
        Emission::NoTarget
    }

    fn clear_cycle_state(&mut self) {
        self.last_sample = None;
        self.ticks_since_detection = 0;
        self.missed_cycles = 0;
    }

    /// Whether the scheduler is running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a detector call is unresolved
    #[must_use]
    pub const fn detection_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last known sample
    #[must_use]
    pub const fn last_sample(&self) -> Option<EyeSample> {
        self.last_sample
    }

    /// Dimensions currently reported by the capture source
    #[must_use]
    pub fn surface(&self) -> (u32, u32) {
        self.capture.dimensions()
    }

    /// Detector latency summary
    #[must_use]
    pub fn stats(&self) -> Option<LatencySummary> {
        self.stats.summary()
    }

    /// Advance the loop by one host frame.
    ///
    /// Never blocks on the detector: a finished task is collected, and a new
    /// one is issued only when nothing is in flight and the tick is not
    /// throttled.
    pub async fn tick(&mut self) -> Emission {
        if !self.running {
            return Emission::Idle;
        }

        let mut fresh = None;

        if self.in_flight.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = self.in_flight.take() {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => (Err(e.into()), Duration::ZERO),
                };
                fresh = self.complete_cycle(outcome);
            }
        }

        // The collecting tick counts toward the cadence, so frame_skip 1 detects every frame
        if self.in_flight.is_none() {
            self.ticks_since_detection += 1;
            if self.ticks_since_detection >= self.config.frame_skip {
                self.ticks_since_detection = 0;
                self.issue_detection();
            }
        }

        if let Some(sample) = fresh {
            Emission::Fresh(sample)
        } else if let Some(sample) = self.last_sample {
            Emission::Held(sample)
        } else if self.missed_cycles >= NO_TARGET_MISS_CYCLES {
            Emission::NoTarget
        } else {
            Emission::Pending
        }
    }

    fn issue_detection(&mut self) {
        let (width, height) = self.capture.dimensions();
        if width == 0 || height == 0 {
            debug!("Capture surface has zero size, skipping detection");
            self.record_miss();
            return;
        }

        let Some(frame) = self.capture.frame() else {
            debug!("No frame available from capture source");
            self.record_miss();
            return;
        };

        let detector = Arc::clone(&self.detector);
        self.in_flight = Some(tokio::spawn(async move {
            let started = Instant::now();
            let result = detector.detect(&frame).await;
            (result, started.elapsed())
        }));
    }

    fn complete_cycle(&mut self, (result, latency): DetectionOutcome) -> Option<EyeSample> {
        let sample = match result {
            Ok(Some(landmarks)) => match EyeSample::from_landmarks(&landmarks) {
                Ok(sample) => Some(sample),
                Err(e) => {
                    warn!("Discarding detection: {}", e);
                    None
                }
            },
            Ok(None) => {
                debug!("No face detected");
                None
            }
            Err(e) => {
                warn!("Detection error: {}", e);
                None
            }
        };

        self.stats.record(latency, sample.is_none());
        if let Some(summary) = self.stats.summary() {
            debug!(
                "Processing time: {:.0}ms, detector FPS: {:.0}",
                summary.mean_ms, summary.detections_per_second
            );
        }

        match sample {
            Some(sample) => {
                self.last_sample = Some(sample);
                self.missed_cycles = 0;
                Some(sample)
            }
            None => {
                self.record_miss();
                None
            }
        }
    }

    fn record_miss(&mut self) {
        self.missed_cycles = self.missed_cycles.saturating_add(1);
        if let Some(limit) = self.config.hold_limit {
            if self.missed_cycles > limit && self.last_sample.take().is_some() {
                info!("Face lost for {} cycles, dropping held sample", self.missed_cycles);
            }
        }
    }
}

impl Drop for DetectionScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
