//! Synthetic collaborators for running the pipeline without a camera.
//!
//! Used by the demo binary and by tests: a capture source with settable
//! dimensions, detectors that replay a script or trace a moving head, and
//! surfaces/sinks that record what they receive.

use crate::{
    conditioning::ControlSink,
    detection::{CaptureSource, EyeLandmarks, Frame, LandmarkDetector},
    follower::{CameraPose, RenderSurface},
    normalizer::{NormalizedDistance, NormalizedPosition},
    Error, Result,
};
use async_trait::async_trait;
use log::{debug, info};
use nalgebra::Point2;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Six points around an eye centre, the shape a landmark model reports
fn eye_outline(cx: f64, cy: f64, half_width: f64) -> Vec<Point2<f64>> {
    let h = half_width * 0.4;
    vec![
        Point2::new(cx - half_width, cy),
        Point2::new(cx - half_width * 0.5, cy - h),
        Point2::new(cx + half_width * 0.5, cy - h),
        Point2::new(cx + half_width, cy),
        Point2::new(cx + half_width * 0.5, cy + h),
        Point2::new(cx - half_width * 0.5, cy + h),
    ]
}

/// Landmarks for eyes centred at the given pixel coordinates
#[must_use]
pub fn landmarks_at(left: (f64, f64), right: (f64, f64)) -> EyeLandmarks {
    let half_width = ((right.0 - left.0).hypot(right.1 - left.1) * 0.2).max(1.0);
    EyeLandmarks::new(
        eye_outline(left.0, left.1, half_width),
        eye_outline(right.0, right.1, half_width),
    )
}

/// Shared view of a [`SyntheticCapture`] after it has been boxed
#[derive(Debug, Default)]
pub struct CaptureProbe {
    width: AtomicU32,
    height: AtomicU32,
    active: AtomicBool,
    starts: AtomicU32,
    stops: AtomicU32,
    frames: AtomicU64,
}

impl CaptureProbe {
    /// Change the reported surface dimensions
    pub fn resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::SeqCst);
        self.height.store(height, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }

    /// Frames handed out so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }
}

/// Capture source producing empty frames of a settable size
#[derive(Debug)]
pub struct SyntheticCapture {
    probe: Arc<CaptureProbe>,
    fail_start: bool,
}

impl SyntheticCapture {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let probe = Arc::new(CaptureProbe::default());
        probe.resize(width, height);
        Self {
            probe,
            fail_start: false,
        }
    }

    /// A source whose `start` always fails, like a denied camera permission
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            fail_start: true,
            ..Self::new(0, 0)
        }
    }

    /// Handle for resizing and inspecting the source after it is boxed
    #[must_use]
    pub fn probe(&self) -> Arc<CaptureProbe> {
        Arc::clone(&self.probe)
    }
}

impl CaptureSource for SyntheticCapture {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(Error::Capture("Capture device unavailable".to_string()));
        }
        self.probe.starts.fetch_add(1, Ordering::SeqCst);
        self.probe.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
        self.probe.active.store(false, Ordering::SeqCst);
    }

    fn dimensions(&self) -> (u32, u32) {
        (
            self.probe.width.load(Ordering::SeqCst),
            self.probe.height.load(Ordering::SeqCst),
        )
    }

    fn frame(&mut self) -> Option<Frame> {
        if !self.probe.is_active() {
            return None;
        }
        self.probe.frames.fetch_add(1, Ordering::SeqCst);
        let (width, height) = self.dimensions();
        Some(Frame::empty(width, height))
    }
}

/// One scripted detector outcome
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorStep {
    /// A face with these eye landmarks
    Face(EyeLandmarks),
    /// Detector ran and found nothing
    NoFace,
    /// Detector raised an error
    Fail,
}

impl DetectorStep {
    /// A face with eye centres at `(lx, ly)` and `(rx, ry)` in pixels
    #[must_use]
    pub fn face(lx: f64, ly: f64, rx: f64, ry: f64) -> Self {
        Self::Face(landmarks_at((lx, ly), (rx, ry)))
    }
}

/// Detector that replays a fixed list of outcomes, then reports no face
pub struct ScriptedDetector {
    steps: tokio::sync::Mutex<VecDeque<DetectorStep>>,
    latency: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_concurrent: AtomicUsize,
}

impl ScriptedDetector {
    #[must_use]
    pub fn new(steps: Vec<DetectorStep>) -> Self {
        Self {
            steps: tokio::sync::Mutex::new(steps.into()),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of detect calls started
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same time
    #[must_use]
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LandmarkDetector for ScriptedDetector {
    async fn detect(&self, _frame: &Frame) -> Result<Option<EyeLandmarks>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(running, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let step = self.steps.lock().await.pop_front();

        self.active.fetch_sub(1, Ordering::SeqCst);
        match step {
            Some(DetectorStep::Face(landmarks)) => Ok(Some(landmarks)),
            Some(DetectorStep::Fail) => Err(Error::Detection("Scripted detector failure".to_string())),
            Some(DetectorStep::NoFace) | None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "ScriptedDetector"
    }
}

/// Parameters for the moving-head detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitingFaceConfig {
    /// Horizontal sweep as a fraction of the frame width
    pub amplitude_x: f64,
    /// Vertical sweep as a fraction of the frame height
    pub amplitude_y: f64,
    /// Inter-eye distance as a fraction of the frame width, at rest
    pub eye_spacing: f64,
    /// How far the viewer leans in and out, relative to `eye_spacing`
    pub lean: f64,
    /// Detections per full horizontal sweep
    pub period: u64,
    /// Pixel noise added to each eye centre
    pub jitter_px: f64,
    /// Every Nth detection finds no face
    pub dropout_every: Option<u64>,
}

impl Default for OrbitingFaceConfig {
    fn default() -> Self {
        Self {
            amplitude_x: 0.3,
            amplitude_y: 0.2,
            eye_spacing: 0.1,
            lean: 0.3,
            period: 240,
            jitter_px: 1.5,
            dropout_every: None,
        }
    }
}

/// Detector tracing a Lissajous head path across the frame
pub struct OrbitingFace {
    config: OrbitingFaceConfig,
    step: AtomicU64,
}

impl OrbitingFace {
    #[must_use]
    pub fn new(config: OrbitingFaceConfig) -> Self {
        info!("Simulated face path with period {} detections", config.period);
        Self {
            config,
            step: AtomicU64::new(0),
        }
    }

    /// Deterministic noise in `[-1, 1]`
    fn noise(seed: f64) -> f64 {
        ((seed * 12.9898).sin() * 43_758.545_3).fract().abs() * 2.0 - 1.0
    }

    /// Eye centres for detection number `step` in a `width` x `height` frame
    #[must_use]
    pub fn eyes_at(&self, step: u64, width: u32, height: u32) -> ((f64, f64), (f64, f64)) {
        let c = &self.config;
        let w = f64::from(width);
        let h = f64::from(height);
        let phase = std::f64::consts::TAU * step as f64 / c.period.max(1) as f64;

        let cx = w * (0.5 + c.amplitude_x * phase.sin());
        let cy = h * (0.5 + c.amplitude_y * (2.0 * phase).sin());
        let spacing = w * c.eye_spacing * (1.0 + c.lean * (0.5 * phase).sin());

        let jitter = |k: f64| c.jitter_px * Self::noise(step as f64 + k);
        (
            (cx - spacing / 2.0 + jitter(0.1), cy + jitter(0.2)),
            (cx + spacing / 2.0 + jitter(0.3), cy + jitter(0.4)),
        )
    }
}

#[async_trait]
impl LandmarkDetector for OrbitingFace {
    async fn detect(&self, frame: &Frame) -> Result<Option<EyeLandmarks>> {
        if !frame.has_area() {
            return Err(Error::Detection("Frame has zero size".to_string()));
        }
        let step = self.step.fetch_add(1, Ordering::SeqCst);

        if let Some(every) = self.config.dropout_every {
            if every > 0 && step % every == every - 1 {
                debug!("Simulated dropout at detection {}", step);
                return Ok(None);
            }
        }

        let (left, right) = self.eyes_at(step, frame.width, frame.height);
        Ok(Some(landmarks_at(left, right)))
    }

    fn name(&self) -> &str {
        "OrbitingFace"
    }
}

/// Render surface keeping every pose it is given
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    poses: Arc<Mutex<Vec<CameraPose>>>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Poses recorded so far
    #[must_use]
    pub fn poses(&self) -> Vec<CameraPose> {
        self.poses.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Most recent pose
    #[must_use]
    pub fn last(&self) -> Option<CameraPose> {
        self.poses.lock().ok().and_then(|p| p.last().copied())
    }
}

impl RenderSurface for RecordingSurface {
    fn apply_camera(&mut self, pose: &CameraPose) {
        if let Ok(mut poses) = self.poses.lock() {
            poses.push(*pose);
        }
    }
}

/// Render surface that logs the camera pose every `every` frames
#[derive(Debug)]
pub struct LogSurface {
    every: u64,
    frames: u64,
}

impl LogSurface {
    #[must_use]
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            frames: 0,
        }
    }
}

impl RenderSurface for LogSurface {
    fn apply_camera(&mut self, pose: &CameraPose) {
        self.frames += 1;
        if self.frames % self.every == 0 {
            info!(
                "Frame {}: camera ({:.3}, {:.3}, {:.3})",
                self.frames, pose.position.x, pose.position.y, pose.position.z
            );
        }
    }
}

/// A control event seen by a [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkEvent {
    Position(Option<NormalizedPosition>),
    Distance(Option<NormalizedDistance>),
}

/// Control sink keeping every event it is given
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Only the position events, in order
    #[must_use]
    pub fn positions(&self) -> Vec<Option<NormalizedPosition>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Position(p) => Some(p),
                SinkEvent::Distance(_) => None,
            })
            .collect()
    }

    /// Only the distance events, in order
    #[must_use]
    pub fn distances(&self) -> Vec<Option<NormalizedDistance>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Distance(d) => Some(d),
                SinkEvent::Position(_) => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ControlSink for RecordingSink {
    fn on_control_signal_change(&mut self, position: Option<NormalizedPosition>) {
        self.push(SinkEvent::Position(position));
    }

    fn on_distance_change(&mut self, distance: Option<NormalizedDistance>) {
        self.push(SinkEvent::Distance(distance));
    }
}
