//! Configuration management for the gaze parallax pipeline

use crate::{
    conditioning::ConditioningConfig,
    constants::{DEFAULT_DETECTOR_INPUT_SIZE, DEFAULT_DETECTOR_SCORE_THRESHOLD, DEFAULT_FPS, MAX_FPS, MIN_FPS},
    detection::DetectorOptions,
    follower::CameraConfig,
    scheduler::SchedulerConfig,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Options passed through to the landmark detector
    pub detector: DetectorConfig,

    /// Detection cadence
    pub scheduler: SchedulerConfig,

    /// Smoothing and deadzone parameters
    pub conditioning: ConditioningConfig,

    /// Camera follower parameters
    pub camera: CameraConfig,

    /// Render loop parameters
    pub render: RenderConfig,
}

/// Landmark detector options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Square input size the detector resizes frames to
    pub input_size: u32,

    /// Minimum face score (0.0-1.0)
    pub score_threshold: f32,
}

/// Render loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target framerate of the render loop
    pub target_fps: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_DETECTOR_INPUT_SIZE,
            score_threshold: DEFAULT_DETECTOR_SCORE_THRESHOLD,
        }
    }
}

impl From<DetectorConfig> for DetectorOptions {
    fn from(config: DetectorConfig) -> Self {
        Self {
            input_size: config.input_size,
            score_threshold: config.score_threshold,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { target_fps: DEFAULT_FPS }
    }
}

fn unit_alpha(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn check_fps(name: &str, fps: f64) -> Result<()> {
    if (MIN_FPS..=MAX_FPS).contains(&fps) {
        Ok(())
    } else {
        Err(Error::ConfigError(format!(
            "{} FPS must be between {} and {}, got {}",
            name, MIN_FPS, MAX_FPS, fps
        )))
    }
}

impl Config {
    /// Options to build a landmark detector with
    #[must_use]
    pub fn detector_options(&self) -> DetectorOptions {
        self.detector.into()
    }

    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read, `ConfigError` if it does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the content does not parse
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if serialization fails, `IoError` if the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        // Detector
        if !(0.0..=1.0).contains(&self.detector.score_threshold) {
            return Err(Error::ConfigError(
                "Score threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.detector.input_size == 0 {
            return Err(Error::ConfigError("Detector input size must be greater than 0".to_string()));
        }

        // Scheduler
        if self.scheduler.frame_skip == 0 {
            return Err(Error::ConfigError("Frame skip must be greater than 0".to_string()));
        }
        check_fps("Scheduler", self.scheduler.target_fps)?;

        // Conditioning
        if !unit_alpha(self.conditioning.position_alpha) || !unit_alpha(self.conditioning.distance_alpha) {
            return Err(Error::ConfigError("Smoothing alpha must be in (0, 1]".to_string()));
        }
        if !(self.conditioning.position_deadzone >= 0.0 && self.conditioning.distance_deadzone >= 0.0) {
            return Err(Error::ConfigError("Deadzone thresholds must be non-negative".to_string()));
        }

        // Camera
        let camera = &self.camera;
        if !unit_alpha(camera.damping) {
            return Err(Error::ConfigError("Camera damping must be in (0, 1]".to_string()));
        }
        if !(camera.min_zoom <= camera.max_zoom) {
            return Err(Error::ConfigError(format!(
                "Minimum zoom {} exceeds maximum zoom {}",
                camera.min_zoom, camera.max_zoom
            )));
        }
        if !(camera.orbit_min_distance > 0.0 && camera.orbit_min_distance <= camera.orbit_max_distance) {
            return Err(Error::ConfigError(
                "Orbit distances must be positive with min <= max".to_string(),
            ));
        }
        for (axis, curve) in [("x", camera.sensitivity.x), ("y", camera.sensitivity.y)] {
            if curve.near_range.0 > curve.near_range.1 || curve.far_range.0 > curve.far_range.1 {
                return Err(Error::ConfigError(format!(
                    "Sensitivity range for {} axis must be ordered (min, max)",
                    axis
                )));
            }
        }

        // Render
        check_fps("Render", self.render.target_fps)
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Parallax Configuration

# Landmark detector options
detector:
  input_size: 224
  score_threshold: 0.6

# Detection cadence
scheduler:
  frame_skip: 1
  hold_limit: null
  target_fps: 60.0

# Smoothing and deadzone
conditioning:
  position_alpha: 0.1
  distance_alpha: 0.1
  position_deadzone: 0.005
  distance_deadzone: 0.001
  axis_gate: any
  outputs: position_and_distance

# Camera follower
camera:
  mode: gaze
  damping: 0.02
  zoom: 5.0
  min_zoom: 3.0
  max_zoom: 12.0
  sensitivity:
    x:
      near_scale: 2.5
      far_scale: 6.0
      near_range: [-1.8, 1.8]
      far_range: [-4.5, 4.5]
    y:
      near_scale: 8.0
      far_scale: 25.0
      near_range: [-1.0, 7.0]
      far_range: [-3.2, 3.4]
  orbit_min_distance: 2.0
  orbit_max_distance: 20.0

# Render loop
render:
  target_fps: 60.0
"#;
