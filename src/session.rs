//! One tracking session: detection scheduling, normalization and
//! conditioning behind a single owned value with an explicit lifecycle.
//!
//! The latest [`ControlSignal`] is published on a watch channel so render
//! loops can read it without ever waiting on detection.

use crate::{
    conditioning::{ConditioningConfig, ConditioningPipeline, ControlSignal, ControlSink, ControlUpdate},
    normalizer::CoordinateNormalizer,
    scheduler::{DetectionScheduler, Emission},
    stats::LatencySummary,
    Result,
};
use log::{debug, info};
use tokio::sync::watch;

/// Owns the per-session state of the tracking pipeline
pub struct TrackingSession {
    scheduler: DetectionScheduler,
    normalizer: CoordinateNormalizer,
    conditioning: ConditioningPipeline,
    sinks: Vec<Box<dyn ControlSink>>,
    signal: watch::Sender<ControlSignal>,
}

impl TrackingSession {
    /// Assemble a session from a scheduler and conditioning parameters
    #[must_use]
    pub fn new(scheduler: DetectionScheduler, conditioning: ConditioningConfig) -> Self {
        Self::with_pipeline(scheduler, ConditioningPipeline::new(conditioning))
    }

    /// Assemble a session around a prepared conditioning pipeline
    #[must_use]
    pub fn with_pipeline(scheduler: DetectionScheduler, conditioning: ConditioningPipeline) -> Self {
        let (signal, _) = watch::channel(ControlSignal::NEUTRAL);
        Self {
            scheduler,
            normalizer: CoordinateNormalizer::new(),
            conditioning,
            sinks: Vec::new(),
            signal,
        }
    }

    /// Receiver always holding the latest control signal
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControlSignal> {
        self.signal.subscribe()
    }

    /// Register a sink notified on every signal change
    pub fn add_sink(&mut self, sink: Box<dyn ControlSink>) {
        self.sinks.push(sink);
    }

    /// Start capture and detection.
    ///
    /// # Errors
    ///
    /// Returns the capture error when the source cannot be acquired; the
    /// session stays stopped and the signal stays neutral
    pub fn start(&mut self) -> Result<()> {
        self.scheduler.start()?;
        info!("Tracking session started");
        Ok(())
    }

    /// Stop detection and return the signal to neutral. Safe to call repeatedly.
    pub fn stop(&mut self) {
        let was_running = self.scheduler.is_running();
        self.scheduler.stop();
        self.recentre();
        self.normalizer.reset();
        if was_running {
            info!("Tracking session stopped");
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Latest published control signal
    #[must_use]
    pub fn current(&self) -> ControlSignal {
        *self.signal.borrow()
    }

    /// Detector latency summary
    #[must_use]
    pub fn stats(&self) -> Option<LatencySummary> {
        self.scheduler.stats()
    }

    #[must_use]
    pub const fn normalizer(&self) -> &CoordinateNormalizer {
        &self.normalizer
    }

    /// Advance one host frame and return the signal after it
    pub async fn tick(&mut self) -> ControlSignal {
        match self.scheduler.tick().await {
            Emission::Fresh(sample) | Emission::Held(sample) => {
                let (width, height) = self.scheduler.surface();
                if !self.normalizer.update_surface(width, height) {
                    debug!("Surface not ready, keeping previous signal");
                    return self.current();
                }
                if let Some(normalized) = self.normalizer.normalize(&sample) {
                    let update = self.conditioning.process(normalized);
                    self.publish(update);
                }
            }
            Emission::NoTarget => self.recentre(),
            Emission::Pending | Emission::Idle => {}
        }
        self.current()
    }

    fn recentre(&mut self) {
        let update = self.conditioning.reset();
        if update.position_changed || update.distance_changed {
            debug!("No target, recentring");
        }
        self.publish(update);
    }

    fn publish(&mut self, update: ControlUpdate) {
        if !(update.position_changed || update.distance_changed) {
            return;
        }
        for sink in &mut self.sinks {
            update.notify(sink.as_mut());
        }
        self.signal.send_replace(update.signal);
    }
}
