//! Eye-tracking driven parallax camera.
//!
//! A webcam landmark detector reports the viewer's eyes; this library turns
//! those detections into a smooth camera motion:
//! 1. The detection scheduler runs the detector without blocking rendering
//!    and holds the last good sample between detections
//! 2. The coordinate normalizer maps pixel samples into `[-1, 1]` control space
//! 3. The conditioning pipeline smooths the signal and applies a deadzone
//! 4. The camera follower eases the camera toward the zoom-scaled target
//!
//! # Examples
//!
//! ## Conditioning a signal
//!
//! ```
//! use gaze_parallax::conditioning::{ConditioningConfig, ConditioningPipeline};
//! use gaze_parallax::normalizer::{NormalizedPosition, NormalizedSample};
//!
//! let mut pipeline = ConditioningPipeline::new(ConditioningConfig::default());
//! let update = pipeline.process(NormalizedSample {
//!     position: NormalizedPosition::new(0.3, -0.1),
//!     distance: 0.08,
//! });
//! assert!(update.position_changed);
//! ```
//!
//! ## Following a target
//!
//! ```
//! use gaze_parallax::follower::{CameraConfig, CameraFollower};
//! use gaze_parallax::normalizer::NormalizedPosition;
//!
//! # fn main() -> gaze_parallax::Result<()> {
//! let mut follower = CameraFollower::new(&CameraConfig::default())?;
//! let pose = follower.tick(Some(NormalizedPosition::new(0.5, 0.5)));
//! assert!(pose.position.x > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Full pipeline
//!
//! ```no_run
//! use gaze_parallax::{app::ParallaxApp, config::Config};
//! use gaze_parallax::simulation::{LogSurface, OrbitingFace, OrbitingFaceConfig, SyntheticCapture};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn demo() -> gaze_parallax::Result<()> {
//! let app = ParallaxApp::new(
//!     Config::default(),
//!     Arc::new(OrbitingFace::new(OrbitingFaceConfig::default())),
//!     Box::new(SyntheticCapture::new(640, 480)),
//!     Box::new(LogSurface::new(60)),
//! )?;
//! let summary = app.run(Some(Duration::from_secs(5)), std::future::pending()).await?;
//! println!("{} frames", summary.frames);
//! # Ok(())
//! # }
//! ```

/// Detector and capture boundary types
pub mod detection;

/// Detection loop scheduling and the held-sample slot
pub mod scheduler;

/// Rolling detector latency statistics
pub mod stats;

/// Pixel to control-space mapping
pub mod normalizer;

/// Smoothing and deadzone filters
pub mod filters;

/// Position and distance conditioning pipeline
pub mod conditioning;

/// Zoom-dependent camera follower
pub mod follower;

/// Tracking session lifecycle
pub mod session;

/// Synthetic capture, detectors and recording surfaces
pub mod simulation;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
