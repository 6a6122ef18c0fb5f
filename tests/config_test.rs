//! Tests for configuration loading and saving

use gaze_parallax::config::{Config, EXAMPLE_CONFIG};
use gaze_parallax::follower::FollowMode;
use gaze_parallax::Error;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_save_and_reload() {
    let mut config = Config::default();
    config.scheduler.frame_skip = 3;
    config.scheduler.hold_limit = Some(10);
    config.camera.mode = FollowMode::Orbit;
    config.conditioning.position_alpha = 0.2;

    let file = NamedTempFile::new().unwrap();
    config.to_file(file.path()).unwrap();
    let loaded = Config::from_file(file.path()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_example_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE_CONFIG.as_bytes()).unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.camera.sensitivity.y.far_range, (-3.2, 3.4));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Config::from_file(dir.path().join("missing.yaml"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_invalid_values_fail_validation() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "camera:\n  damping: 1.5").unwrap();
    let config = Config::from_file(file.path()).unwrap();
    assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
}
