//! Signal conditioning: smoothing followed by a deadzone, applied
//! independently to the eye position and to the inter-eye distance.

use crate::{
    constants::{
        DEFAULT_DISTANCE_ALPHA, DEFAULT_DISTANCE_DEADZONE, DEFAULT_POSITION_ALPHA, DEFAULT_POSITION_DEADZONE,
    },
    filters::{
        deadzone::{AxisGate, Deadzone},
        exponential::{ExponentialFilter, ScalarExponentialFilter},
        SignalFilter,
    },
    normalizer::{NormalizedDistance, NormalizedPosition, NormalizedSample},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which conditioned outputs a caller wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outputs {
    /// Position only; distance stays `None`
    PositionOnly,
    /// Position and inter-eye distance
    #[default]
    PositionAndDistance,
}

impl Outputs {
    #[must_use]
    pub const fn includes_distance(self) -> bool {
        matches!(self, Self::PositionAndDistance)
    }
}

/// Parameters for the conditioning stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningConfig {
    /// Smoothing factor for position, in (0, 1]
    pub position_alpha: f64,
    /// Smoothing factor for distance, in (0, 1]
    pub distance_alpha: f64,
    /// Deadzone threshold for position (normalized units)
    pub position_deadzone: f64,
    /// Deadzone threshold for distance (normalized units)
    pub distance_deadzone: f64,
    /// How per-axis deadzone checks combine
    pub axis_gate: AxisGate,
    /// Requested outputs
    pub outputs: Outputs,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            position_alpha: DEFAULT_POSITION_ALPHA,
            distance_alpha: DEFAULT_DISTANCE_ALPHA,
            position_deadzone: DEFAULT_POSITION_DEADZONE,
            distance_deadzone: DEFAULT_DISTANCE_DEADZONE,
            axis_gate: AxisGate::default(),
            outputs: Outputs::default(),
        }
    }
}

/// The conditioned control signal; `None` fields mean neutral / no target
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlSignal {
    pub position: Option<NormalizedPosition>,
    pub distance: Option<NormalizedDistance>,
}

impl ControlSignal {
    /// Neutral signal: camera recentres, zoom is not driven
    pub const NEUTRAL: Self = Self {
        position: None,
        distance: None,
    };
}

/// Result of feeding one sample through the pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlUpdate {
    pub signal: ControlSignal,
    pub position_changed: bool,
    pub distance_changed: bool,
}

/// Receiver of control-signal changes
pub trait ControlSink: Send {
    /// Fired when the post-deadzone position changes; `None` means centre
    fn on_control_signal_change(&mut self, position: Option<NormalizedPosition>);

    /// Fired when the post-deadzone distance changes; `None` means no face
    fn on_distance_change(&mut self, _distance: Option<NormalizedDistance>) {}
}

/// Smoothing and deadzone for position and distance.
///
/// The filter pair and the last-emitted pair are one unit: `reset` clears
/// all four together.
pub struct ConditioningPipeline {
    position_filter: Box<dyn SignalFilter>,
    distance_filter: ScalarExponentialFilter,
    position_deadzone: Deadzone,
    distance_deadzone: Deadzone,
    axis_gate: AxisGate,
    outputs: Outputs,
    last_position: Option<NormalizedPosition>,
    last_distance: Option<NormalizedDistance>,
}

impl ConditioningPipeline {
    /// Create a pipeline with exponential position smoothing
    ///
    /// # Panics
    ///
    /// Panics if an alpha is outside (0, 1] or a deadzone is negative
    #[must_use]
    pub fn new(config: ConditioningConfig) -> Self {
        Self::with_position_filter(config, Box::new(ExponentialFilter::new(config.position_alpha)))
    }

    /// Create a pipeline with a caller-supplied position filter
    ///
    /// # Panics
    ///
    /// Panics if the distance alpha is outside (0, 1] or a deadzone is negative
    #[must_use]
    pub fn with_position_filter(config: ConditioningConfig, position_filter: Box<dyn SignalFilter>) -> Self {
        debug!(
            "Conditioning with {} (position), alpha {} (distance), outputs {:?}",
            position_filter.name(),
            config.distance_alpha,
            config.outputs
        );
        Self {
            position_filter,
            distance_filter: ScalarExponentialFilter::new(config.distance_alpha),
            position_deadzone: Deadzone::new(config.position_deadzone),
            distance_deadzone: Deadzone::new(config.distance_deadzone),
            axis_gate: config.axis_gate,
            outputs: config.outputs,
            last_position: None,
            last_distance: None,
        }
    }

    /// Feed one normalized sample and return the conditioned signal
    pub fn process(&mut self, sample: NormalizedSample) -> ControlUpdate {
        let (sx, sy) = self.position_filter.apply(sample.position.x, sample.position.y);
        let (px, py) = self.position_deadzone.apply_position(
            (sx, sy),
            self.last_position.map(|p| (p.x, p.y)),
            self.axis_gate,
        );
        let position = NormalizedPosition::new(px, py);
        let position_changed = self.last_position != Some(position);
        self.last_position = Some(position);

        let distance_changed = if self.outputs.includes_distance() {
            let smoothed = self.distance_filter.update(sample.distance);
            let distance = self.distance_deadzone.apply(smoothed, self.last_distance);
            let changed = self.last_distance != Some(distance);
            self.last_distance = Some(distance);
            changed
        } else {
            false
        };

        ControlUpdate {
            signal: self.current(),
            position_changed,
            distance_changed,
        }
    }

    /// Clear both filters and both last-emitted values.
    ///
    /// Returns an update describing the transition to the neutral signal.
    pub fn reset(&mut self) -> ControlUpdate {
        let position_changed = self.last_position.is_some();
        let distance_changed = self.last_distance.is_some();

        self.position_filter.reset();
        self.distance_filter.reset();
        self.last_position = None;
        self.last_distance = None;

        ControlUpdate {
            signal: ControlSignal::NEUTRAL,
            position_changed,
            distance_changed,
        }
    }

    /// Last emitted signal
    #[must_use]
    pub fn current(&self) -> ControlSignal {
        ControlSignal {
            position: self.last_position,
            distance: self.last_distance,
        }
    }

}

impl ControlUpdate {
    /// Forward the changed parts of this update to a sink
    pub fn notify(&self, sink: &mut dyn ControlSink) {
        if self.position_changed {
            sink.on_control_signal_change(self.signal.position);
        }
        if self.distance_changed {
            sink.on_distance_change(self.signal.distance);
        }
    }
}
