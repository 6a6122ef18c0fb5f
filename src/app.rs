//! Main application module: runs the detection loop and the render loop
//! side by side until a shutdown signal or a time limit.

use crate::{
    config::Config,
    detection::{CaptureSource, LandmarkDetector},
    follower::{CameraFollower, CameraPose, RenderSurface},
    scheduler::DetectionScheduler,
    session::TrackingSession,
    stats::LatencySummary,
    Error, Result,
};
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Outcome of one application run
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Render frames produced
    pub frames: u64,
    /// Camera pose after the last frame
    pub final_pose: CameraPose,
    /// Detector latency over the last window, if any detection finished
    pub detection: Option<LatencySummary>,
    /// Wall-clock run time
    pub elapsed: Duration,
}

/// Main application
pub struct ParallaxApp {
    config: Config,
    session: TrackingSession,
    follower: CameraFollower,
    surface: Box<dyn RenderSurface>,
}

fn period(fps: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(1.0 / fps) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(Error::ConfigError(format!("Cannot drive a loop at {} FPS", fps))),
    }
}

impl ParallaxApp {
    /// Create a new application instance
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration does not validate
    pub fn new(
        config: Config,
        detector: Arc<dyn LandmarkDetector>,
        capture: Box<dyn CaptureSource>,
        surface: Box<dyn RenderSurface>,
    ) -> Result<Self> {
        info!("Initializing gaze parallax application");
        config.validate()?;

        let scheduler = DetectionScheduler::new(detector, capture, config.scheduler);
        let session = TrackingSession::new(scheduler, config.conditioning);
        let follower = CameraFollower::new(&config.camera)?;

        Ok(Self {
            config,
            session,
            follower,
            surface,
        })
    }

    /// Tracking session, for registering sinks before `run`
    pub fn session_mut(&mut self) -> &mut TrackingSession {
        &mut self.session
    }

    /// Camera follower, for scroll and pointer input before `run`
    pub fn follower_mut(&mut self) -> &mut CameraFollower {
        &mut self.follower
    }

    /// Run both loops until `shutdown` resolves or `duration` elapses.
    ///
    /// The detection loop runs as its own task and publishes the control
    /// signal; the render loop only reads the latest value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a loop rate has no usable period, or the
    /// capture error if tracking cannot start
    pub async fn run<F>(self, duration: Option<Duration>, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let Self {
            config,
            mut session,
            mut follower,
            mut surface,
        } = self;

        let detection_period = period(config.scheduler.target_fps)?;
        let render_period = period(config.render.target_fps)?;

        info!("Starting main application loop");
        session.start()?;
        let signal = session.subscribe();

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let detection = tokio::spawn(async move {
            let mut interval = tokio::time::interval(detection_period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        session.tick().await;
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            session.stop();
            session
        });

        let started = Instant::now();
        let deadline = async {
            match duration {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        let mut render = tokio::time::interval(render_period);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = 0u64;

        info!("Entering render loop");
        loop {
            tokio::select! {
                _ = render.tick() => {
                    let target = signal.borrow().position;
                    follower.render(target, surface.as_mut());
                    frames += 1;
                }
                () = &mut deadline => {
                    info!("Run time limit reached");
                    break;
                }
                () = &mut shutdown => {
                    info!("Exit requested");
                    break;
                }
            }
        }

        if stop_tx.send(true).is_err() {
            debug!("Detection loop already exited before shutdown");
        }
        let session = match detection.await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Detection loop ended abnormally: {}", e);
                None
            }
        };
        let stats = session.as_ref().and_then(TrackingSession::stats);

        if let Some(summary) = stats {
            info!(
                "Detector: {} completed, {} without face, {:.1}ms mean",
                summary.completed, summary.failures, summary.mean_ms
            );
        }
        debug!("Rendered {} frames", frames);
        info!("Application shutting down");

        Ok(RunSummary {
            frames,
            final_pose: *follower.pose(),
            detection: stats,
            elapsed: started.elapsed(),
        })
    }
}
