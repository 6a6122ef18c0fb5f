//! Constants used throughout the application

/// Default host repaint rate used to drive both loops
pub const DEFAULT_FPS: f64 = 60.0;

/// Accepted range for loop rates, in frames per second
pub const MIN_FPS: f64 = 1.0;
pub const MAX_FPS: f64 = 1000.0;

/// Detector is invoked on every Nth tick; 1 disables skipping
pub const DEFAULT_FRAME_SKIP: u32 = 1;

/// Consecutive empty cycles (with nothing held) before a no-target signal
pub const NO_TARGET_MISS_CYCLES: u32 = 2;

/// Number of detector latencies kept for the rolling statistics
pub const DETECTION_STATS_WINDOW: usize = 30;

/// Default detector options handed through to the landmark detector
pub const DEFAULT_DETECTOR_INPUT_SIZE: u32 = 224;
pub const DEFAULT_DETECTOR_SCORE_THRESHOLD: f32 = 0.6;

/// Default smoothing factors (0.05 very smooth, 0.2 more responsive)
pub const DEFAULT_POSITION_ALPHA: f64 = 0.1;
pub const DEFAULT_DISTANCE_ALPHA: f64 = 0.1;

/// Deadzone thresholds in normalized units
pub const DEFAULT_POSITION_DEADZONE: f64 = 0.005;
pub const DEFAULT_DISTANCE_DEADZONE: f64 = 0.001;

/// Per-tick camera easing factor
pub const DEFAULT_CAMERA_DAMPING: f64 = 0.02;

/// Zoom bounds and scroll sensitivity
pub const DEFAULT_ZOOM: f64 = 5.0;
pub const DEFAULT_MIN_ZOOM: f64 = 3.0;
pub const DEFAULT_MAX_ZOOM: f64 = 12.0;
pub const SCROLL_ZOOM_FACTOR: f64 = 0.01;

/// Sensitivity scale factors at the nearest and farthest zoom
pub const NEAR_SCALE_X: f64 = 2.5;
pub const FAR_SCALE_X: f64 = 6.0;
pub const NEAR_SCALE_Y: f64 = 8.0;
pub const FAR_SCALE_Y: f64 = 25.0;

/// Camera offset clamp ranges at the nearest and farthest zoom
pub const NEAR_RANGE_X: (f64, f64) = (-1.8, 1.8);
pub const FAR_RANGE_X: (f64, f64) = (-4.5, 4.5);
pub const NEAR_RANGE_Y: (f64, f64) = (-1.0, 7.0);
pub const FAR_RANGE_Y: (f64, f64) = (-3.2, 3.4);

/// Orbit mode distance limits and pointer sensitivity (radians per pixel)
pub const DEFAULT_ORBIT_MIN_DISTANCE: f64 = 2.0;
pub const DEFAULT_ORBIT_MAX_DISTANCE: f64 = 20.0;
pub const ORBIT_ROTATE_SPEED: f64 = 0.005;

/// Orbit target displacement per pixel of pan, per unit of camera distance
pub const ORBIT_PAN_SPEED: f64 = 0.002;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
