//! Camera follower: turns the control signal and the zoom state into a
//! camera pose, once per render tick.
//!
//! Gaze mode scales the normalized eye position through a zoom-dependent
//! [`SensitivityCurve`], clamps it and eases the camera toward it. Orbit
//! mode ignores gaze and is driven by pointer and scroll input instead.

use crate::{
    constants::{
        DEFAULT_CAMERA_DAMPING, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ORBIT_MAX_DISTANCE,
        DEFAULT_ORBIT_MIN_DISTANCE, DEFAULT_ZOOM, EPSILON, FAR_RANGE_X, FAR_RANGE_Y, FAR_SCALE_X, FAR_SCALE_Y,
        NEAR_RANGE_X, NEAR_RANGE_Y, NEAR_SCALE_X, NEAR_SCALE_Y, ORBIT_PAN_SPEED, ORBIT_ROTATE_SPEED,
        SCROLL_ZOOM_FACTOR,
    },
    normalizer::NormalizedPosition,
    Error, Result,
};
use log::{debug, info};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// Smallest polar angle allowed in orbit mode, keeps the camera off the pole
const ORBIT_POLAR_MARGIN: f64 = 0.01;

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Zoom level bounded by `[min_zoom, max_zoom]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
}

impl ZoomState {
    /// Create a zoom state; the initial zoom is clamped into bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the bounds are not finite or `min > max`
    pub fn new(zoom: f64, min_zoom: f64, max_zoom: f64) -> Result<Self> {
        if !(min_zoom.is_finite() && max_zoom.is_finite() && zoom.is_finite()) {
            return Err(Error::InvalidInput("Zoom values must be finite".to_string()));
        }
        if min_zoom > max_zoom {
            return Err(Error::InvalidInput(format!(
                "Minimum zoom {min_zoom} exceeds maximum zoom {max_zoom}"
            )));
        }
        Ok(Self {
            zoom: zoom.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        })
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    #[must_use]
    pub const fn bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Set zoom directly, clamped into bounds
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
        self.zoom
    }

    /// Apply a scroll delta (wheel `deltaY` units)
    pub fn apply_scroll(&mut self, delta_y: f64) -> f64 {
        self.set_zoom(self.zoom + delta_y * SCROLL_ZOOM_FACTOR)
    }

    /// Position of the zoom between its bounds: 0 = closest, 1 = farthest
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let span = self.max_zoom - self.min_zoom;
        if span.abs() < EPSILON {
            return 0.0;
        }
        ((self.zoom - self.min_zoom) / span).clamp(0.0, 1.0)
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Near/far interpolation endpoints for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCurve {
    pub near_scale: f64,
    pub far_scale: f64,
    pub near_range: (f64, f64),
    pub far_range: (f64, f64),
}

impl AxisCurve {
    fn at(&self, ratio: f64) -> AxisSensitivity {
        let lo = lerp(self.near_range.0, self.far_range.0, ratio);
        let hi = lerp(self.near_range.1, self.far_range.1, ratio);
        AxisSensitivity {
            scale: lerp(self.near_scale, self.far_scale, ratio),
            range: (lo.min(hi), lo.max(hi)),
        }
    }
}

/// Per-axis sensitivity curves, horizontal and vertical independent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCurve {
    pub x: AxisCurve,
    pub y: AxisCurve,
}

impl Default for SensitivityCurve {
    fn default() -> Self {
        Self {
            x: AxisCurve {
                near_scale: NEAR_SCALE_X,
                far_scale: FAR_SCALE_X,
                near_range: NEAR_RANGE_X,
                far_range: FAR_RANGE_X,
            },
            y: AxisCurve {
                near_scale: NEAR_SCALE_Y,
                far_scale: FAR_SCALE_Y,
                near_range: NEAR_RANGE_Y,
                far_range: FAR_RANGE_Y,
            },
        }
    }
}

impl SensitivityCurve {
    /// Evaluate the curve at a zoom ratio in `[0, 1]`
    #[must_use]
    pub fn evaluate(&self, zoom_ratio: f64) -> Sensitivity {
        let t = zoom_ratio.clamp(0.0, 1.0);
        Sensitivity {
            x: self.x.at(t),
            y: self.y.at(t),
        }
    }
}

/// Scale and clamp range for one axis at a given zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSensitivity {
    pub scale: f64,
    pub range: (f64, f64),
}

/// Sensitivity for both axes at a given zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub x: AxisSensitivity,
    pub y: AxisSensitivity,
}

impl Sensitivity {
    /// Target camera offset for a control position
    #[must_use]
    pub fn target(&self, position: NormalizedPosition) -> (f64, f64) {
        (
            (position.x * self.x.scale).clamp(self.x.range.0, self.x.range.1),
            (position.y * self.y.scale).clamp(self.y.range.0, self.y.range.1),
        )
    }
}

/// How the camera is driven for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowMode {
    /// Camera follows the viewer's eyes
    #[default]
    Gaze,
    /// Camera orbits the origin under pointer/scroll control
    Orbit,
}

/// Camera configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Interaction mode, fixed for the session
    pub mode: FollowMode,
    /// Per-tick easing factor in (0, 1]
    pub damping: f64,
    /// Initial zoom (camera distance)
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Gaze sensitivity curves
    pub sensitivity: SensitivityCurve,
    /// Orbit distance limits
    pub orbit_min_distance: f64,
    pub orbit_max_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mode: FollowMode::Gaze,
            damping: DEFAULT_CAMERA_DAMPING,
            zoom: DEFAULT_ZOOM,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            sensitivity: SensitivityCurve::default(),
            orbit_min_distance: DEFAULT_ORBIT_MIN_DISTANCE,
            orbit_max_distance: DEFAULT_ORBIT_MAX_DISTANCE,
        }
    }
}

/// Camera position plus the point it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vector3<f64>,
    pub look_at: Point3<f64>,
}

impl CameraPose {
    /// Camera on the +z axis at `distance`, looking at the origin
    #[must_use]
    pub fn on_axis(distance: f64) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, distance),
            look_at: Point3::origin(),
        }
    }
}

/// Rendering surface the follower writes the camera pose to
pub trait RenderSurface: Send {
    /// Apply the pose for this frame
    fn apply_camera(&mut self, pose: &CameraPose);
}

/// Orbit-mode state
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrbitState {
    target: Vector3<f64>,
    azimuth: f64,
    polar: f64,
}

impl OrbitState {
    fn eye(&self, distance: f64) -> Vector3<f64> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + Vector3::new(distance * sin_polar * sin_az, distance * cos_polar, distance * sin_polar * cos_az)
    }

    /// Screen-plane axes of a camera at the current angles
    fn screen_axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let forward = -Vector3::new(sin_polar * sin_az, cos_polar, sin_polar * cos_az);
        let right = Vector3::new(cos_az, 0.0, -sin_az);
        (right, right.cross(&forward))
    }
}

/// Eases the camera toward the latest control target every render tick
#[derive(Debug, Clone)]
pub struct CameraFollower {
    mode: FollowMode,
    damping: f64,
    zoom: ZoomState,
    curve: SensitivityCurve,
    cached: Option<(f64, Sensitivity)>,
    pose: CameraPose,
    orbit: Option<OrbitState>,
}

impl CameraFollower {
    /// Create a follower from configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for damping outside (0, 1] or invalid zoom bounds
    pub fn new(config: &CameraConfig) -> Result<Self> {
        if !(config.damping > 0.0 && config.damping <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "Damping must be in (0, 1], got {}",
                config.damping
            )));
        }

        let (zoom, orbit) = match config.mode {
            FollowMode::Gaze => (ZoomState::new(config.zoom, config.min_zoom, config.max_zoom)?, None),
            FollowMode::Orbit => (
                ZoomState::new(config.zoom, config.orbit_min_distance, config.orbit_max_distance)?,
                Some(OrbitState {
                    target: Vector3::zeros(),
                    azimuth: 0.0,
                    polar: FRAC_PI_2,
                }),
            ),
        };

        info!("Camera follower in {:?} mode, zoom {:.2}", config.mode, zoom.zoom());

        Ok(Self {
            mode: config.mode,
            damping: config.damping,
            zoom,
            curve: config.sensitivity,
            cached: None,
            pose: CameraPose::on_axis(zoom.zoom()),
            orbit,
        })
    }

    /// Start from a given camera position instead of the on-axis default
    #[must_use]
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.pose.position = position;
        self
    }

    #[must_use]
    pub const fn mode(&self) -> FollowMode {
        self.mode
    }

    #[must_use]
    pub const fn pose(&self) -> &CameraPose {
        &self.pose
    }

    #[must_use]
    pub const fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    /// Bounded scroll input, shared by both modes
    pub fn scroll(&mut self, delta_y: f64) -> f64 {
        let zoom = self.zoom.apply_scroll(delta_y);
        debug!("Zoom set to {:.2}", zoom);
        zoom
    }

    /// Set the zoom directly, clamped into bounds
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom.set_zoom(zoom)
    }

    /// Pointer drag in pixels; only affects orbit mode
    pub fn pointer_drag(&mut self, dx: f64, dy: f64) {
        if let Some(orbit) = self.orbit.as_mut() {
            orbit.azimuth -= dx * ORBIT_ROTATE_SPEED;
            orbit.polar =
                (orbit.polar - dy * ORBIT_ROTATE_SPEED).clamp(ORBIT_POLAR_MARGIN, PI - ORBIT_POLAR_MARGIN);
        }
    }

    /// Pointer pan in pixels; only affects orbit mode.
    ///
    /// Moves the orbit target in the screen plane, scaled by distance. The
    /// target then eases back to the origin on the following ticks.
    pub fn pointer_pan(&mut self, dx: f64, dy: f64) {
        let distance = self.zoom.zoom();
        if let Some(orbit) = self.orbit.as_mut() {
            let (right, up) = orbit.screen_axes();
            orbit.target += (up * dy - right * dx) * ORBIT_PAN_SPEED * distance;
        }
    }

    /// Orbit target, `None` in gaze mode
    #[must_use]
    pub fn orbit_target(&self) -> Option<Vector3<f64>> {
        self.orbit.map(|orbit| orbit.target)
    }

    /// Sensitivity at the current zoom, recomputed only when zoom changed
    pub fn sensitivity(&mut self) -> Sensitivity {
        let zoom = self.zoom.zoom();
        match self.cached {
            Some((cached_zoom, sensitivity)) if cached_zoom == zoom => sensitivity,
            _ => {
                let sensitivity = self.curve.evaluate(self.zoom.ratio());
                self.cached = Some((zoom, sensitivity));
                sensitivity
            }
        }
    }

    /// Advance one render tick toward the latest control target.
    ///
    /// `None` means no target: the camera eases back to centre.
    pub fn tick(&mut self, target: Option<NormalizedPosition>) -> CameraPose {
        let damping = self.damping;
        let zoom = self.zoom.zoom();

        if let Some(orbit) = self.orbit.as_mut() {
            orbit.target -= orbit.target * damping;
            let desired = orbit.eye(zoom);
            self.pose.position += (desired - self.pose.position) * damping;
        } else {
            let (tx, ty) = match target {
                Some(position) => self.sensitivity().target(position),
                None => (0.0, 0.0),
            };
            let position = &mut self.pose.position;
            position.x += (tx - position.x) * damping;
            position.y += (ty - position.y) * damping;
            position.z += (zoom - position.z) * damping;
        }

        self.pose.look_at = Point3::origin();
        self.pose
    }

    /// Tick and write the resulting pose to a surface
    pub fn render(&mut self, target: Option<NormalizedPosition>, surface: &mut dyn RenderSurface) {
        let pose = self.tick(target);
        surface.apply_camera(&pose);
    }
}
