//! Boundary types for the external landmark detector and capture source.
//!
//! The detector itself is a black box: given a frame it yields at most one
//! face, described by the point sets of its two eyes.

use crate::{Error, Result};
use async_trait::async_trait;
use nalgebra::Point2;
use std::sync::Arc;

/// A captured frame handed to the detector
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Raw pixel payload; layout is agreed between capture source and detector
    pub data: Arc<[u8]>,
}

impl Frame {
    /// Create a frame that carries only its dimensions
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Arc::from(Vec::new()),
        }
    }

    /// Whether the frame has a usable (non-zero) size
    #[must_use]
    pub const fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Eye point sets for the single detected face, in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct EyeLandmarks {
    /// Points outlining the left eye
    pub left: Vec<Point2<f64>>,
    /// Points outlining the right eye
    pub right: Vec<Point2<f64>>,
}

impl EyeLandmarks {
    /// Build landmarks from two point sets
    #[must_use]
    pub fn new(left: Vec<Point2<f64>>, right: Vec<Point2<f64>>) -> Self {
        Self { left, right }
    }

    /// Centre of each eye as the mean of its points
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when either eye has no points
    pub fn eye_centers(&self) -> Result<(Point2<f64>, Point2<f64>)> {
        let left = center_point(&self.left)
            .ok_or_else(|| Error::InvalidInput("Left eye has no points".to_string()))?;
        let right = center_point(&self.right)
            .ok_or_else(|| Error::InvalidInput("Right eye has no points".to_string()))?;
        Ok((left, right))
    }
}

/// Mean of a point set
#[must_use]
pub fn center_point(points: &[Point2<f64>]) -> Option<Point2<f64>> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2::new(sx / n, sy / n))
}

/// Per-detection eye midpoint and inter-eye distance, in raw detector pixel space
///
/// Produced once per successful detection and never mutated; the scheduler
/// re-emits it verbatim on ticks where no fresh detection is available.
/// Mirroring into the selfie-view orientation happens in the normalizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeSample {
    /// Midpoint between the two eye centres
    pub mid_point: Point2<f64>,
    /// Distance between the eye centres in pixels
    pub inter_eye_distance_px: f64,
}

impl EyeSample {
    /// Derive a sample from detected landmarks
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when an eye has no points
    pub fn from_landmarks(landmarks: &EyeLandmarks) -> Result<Self> {
        let (left, right) = landmarks.eye_centers()?;

        Ok(Self {
            mid_point: nalgebra::center(&left, &right),
            inter_eye_distance_px: nalgebra::distance(&left, &right),
        })
    }
}

/// Detector options passed through from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
    /// Square input size the detector resizes frames to
    pub input_size: u32,
    /// Minimum face score for a detection to count
    pub score_threshold: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            input_size: crate::constants::DEFAULT_DETECTOR_INPUT_SIZE,
            score_threshold: crate::constants::DEFAULT_DETECTOR_SCORE_THRESHOLD,
        }
    }
}

/// External landmark detector
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Detect at most one face in the frame.
    ///
    /// `Ok(None)` means no face; an `Err` is treated by callers the same way.
    async fn detect(&self, frame: &Frame) -> Result<Option<EyeLandmarks>>;

    /// Detector name for logging
    fn name(&self) -> &str {
        "LandmarkDetector"
    }
}

/// External capture source whose lifecycle is owned by a video controller
pub trait CaptureSource: Send {
    /// Acquire the capture device
    ///
    /// # Errors
    ///
    /// Returns `Capture` when the device is unavailable
    fn start(&mut self) -> Result<()>;

    /// Release the capture device; must be safe to call repeatedly
    fn stop(&mut self);

    /// Currently reported surface dimensions `(width, height)`
    fn dimensions(&self) -> (u32, u32);

    /// Latest frame, if one is available
    fn frame(&mut self) -> Option<Frame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(cx: f64, cy: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(cx - 2.0, cy),
            Point2::new(cx, cy - 1.0),
            Point2::new(cx + 2.0, cy),
            Point2::new(cx, cy + 1.0),
        ]
    }

    #[test]
    fn test_center_point() {
        let c = center_point(&eye(10.0, 20.0)).unwrap();
        assert!((c.x - 10.0).abs() < 1e-12);
        assert!((c.y - 20.0).abs() < 1e-12);
        assert!(center_point(&[]).is_none());
    }

    #[test]
    fn test_sample_from_landmarks() {
        let landmarks = EyeLandmarks::new(eye(20.0, 25.0), eye(30.0, 25.0));
        let sample = EyeSample::from_landmarks(&landmarks).unwrap();
        assert!((sample.mid_point.x - 25.0).abs() < 1e-12);
        assert!((sample.mid_point.y - 25.0).abs() < 1e-12);
        assert!((sample.inter_eye_distance_px - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_eye_is_rejected() {
        let landmarks = EyeLandmarks::new(Vec::new(), eye(30.0, 25.0));
        assert!(EyeSample::from_landmarks(&landmarks).is_err());
    }

    #[test]
    fn test_frame_area() {
        assert!(Frame::empty(640, 480).has_area());
        assert!(!Frame::empty(0, 480).has_area());
    }
}
