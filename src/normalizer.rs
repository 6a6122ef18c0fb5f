//! Coordinate normalization from capture-surface pixels to control space.
//!
//! Positions map to `[-1, 1]` on both axes with `+y` up and `x` mirrored to
//! match the selfie-view feed. Distances are divided by the surface
//! diagonal so the same physical eye separation reads the same at any
//! capture resolution.

use crate::detection::EyeSample;
use log::debug;

/// Eye midpoint in control space, both axes clamped to `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Inter-eye distance divided by the surface diagonal, roughly `[0, 0.3]`
pub type NormalizedDistance = f64;

/// Both normalized outputs for one eye sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSample {
    pub position: NormalizedPosition,
    pub distance: NormalizedDistance,
}

/// Cached surface geometry, recomputed only on dimension changes
#[derive(Debug, Clone, Copy, PartialEq)]
struct SurfaceGeometry {
    width: u32,
    height: u32,
    inv_width: f64,
    inv_height: f64,
    inv_diagonal: f64,
}

impl SurfaceGeometry {
    fn new(width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        Self {
            width,
            height,
            inv_width: 1.0 / w,
            inv_height: 1.0 / h,
            inv_diagonal: 1.0 / w.hypot(h),
        }
    }
}

/// Maps pixel-space eye samples into device-independent control signals
#[derive(Debug, Default)]
pub struct CoordinateNormalizer {
    geometry: Option<SurfaceGeometry>,
    recomputations: u64,
}

impl CoordinateNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the current surface dimensions.
    ///
    /// Returns `false` when the surface has zero area; the cached geometry is
    /// dropped and normalization is skipped until a usable size arrives.
    pub fn update_surface(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            if self.geometry.take().is_some() {
                debug!("Capture surface reported zero size, normalization paused");
            }
            return false;
        }

        let changed = self
            .geometry
            .map_or(true, |g| g.width != width || g.height != height);
        if changed {
            debug!("Capture surface is now {}x{}", width, height);
            self.geometry = Some(SurfaceGeometry::new(width, height));
            self.recomputations += 1;
        }
        true
    }

    /// Number of times the surface mapping had to be rebuilt
    #[must_use]
    pub const fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Current surface dimensions, if known and non-zero
    #[must_use]
    pub fn surface(&self) -> Option<(u32, u32)> {
        self.geometry.map(|g| (g.width, g.height))
    }

    /// Normalize a raw pixel midpoint; x is mirrored before mapping
    #[must_use]
    pub fn normalize_position(&self, mid_x: f64, mid_y: f64) -> Option<NormalizedPosition> {
        let g = self.geometry?;
        let mirrored_x = f64::from(g.width) - mid_x;
        Some(NormalizedPosition {
            x: ((mirrored_x * g.inv_width - 0.5) * 2.0).clamp(-1.0, 1.0),
            y: ((0.5 - mid_y * g.inv_height) * 2.0).clamp(-1.0, 1.0),
        })
    }

    /// Normalize a pixel distance by the surface diagonal
    #[must_use]
    pub fn normalize_distance(&self, distance_px: f64) -> Option<NormalizedDistance> {
        self.geometry.map(|g| distance_px * g.inv_diagonal)
    }

    /// Normalize a whole eye sample
    #[must_use]
    pub fn normalize(&self, sample: &EyeSample) -> Option<NormalizedSample> {
        Some(NormalizedSample {
            position: self.normalize_position(sample.mid_point.x, sample.mid_point.y)?,
            distance: self.normalize_distance(sample.inter_eye_distance_px)?,
        })
    }

    /// Forget the cached surface
    pub fn reset(&mut self) {
        self.geometry = None;
    }
}
