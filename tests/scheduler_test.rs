//! Tests for detection scheduling: held samples, no-target signalling and
//! the single in-flight detection guarantee


use gaze_parallax::scheduler::{DetectionScheduler, Emission, SchedulerConfig};
use gaze_parallax::simulation::{DetectorStep, ScriptedDetector, SyntheticCapture};
use gaze_parallax::Error;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::scripted_scheduler;

fn completed(s: &DetectionScheduler) -> u64 {
    s.stats().map_or(0, |summary| summary.completed)
}

/// Tick until one more detection has been collected, issuing one first if needed
async fn cycle(s: &mut DetectionScheduler) -> Emission {
    let before = completed(s);
    loop {
        let emission = s.tick().await;
        if completed(s) > before {
            return emission;
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_three_failures_keep_held_sample() {
    let (mut s, detector) = scripted_scheduler(
        vec![
            DetectorStep::face(40.0, 50.0, 60.0, 50.0),
            DetectorStep::Fail,
            DetectorStep::Fail,
            DetectorStep::Fail,
        ],
        100,
        100,
        SchedulerConfig::default(),
    );
    s.start().unwrap();

    let sample = cycle(&mut s).await.sample().unwrap();
    for _ in 0..3 {
        assert_eq!(cycle(&mut s).await, Emission::Held(sample));
    }
    assert_eq!(s.stats().unwrap().completed, 4);
    assert_eq!(s.stats().unwrap().failures, 3);
    assert!(detector.calls() >= 4);
}

#[tokio::test]
async fn test_hold_limit_drops_sample() {
    let config = SchedulerConfig {
        hold_limit: Some(2),
        ..SchedulerConfig::default()
    };
    let (mut s, _) = scripted_scheduler(
        vec![
            DetectorStep::face(40.0, 50.0, 60.0, 50.0),
            DetectorStep::NoFace,
            DetectorStep::NoFace,
            DetectorStep::NoFace,
        ],
        100,
        100,
        config,
    );
    s.start().unwrap();

    assert!(matches!(cycle(&mut s).await, Emission::Fresh(_)));
    assert!(matches!(cycle(&mut s).await, Emission::Held(_)));
    assert!(matches!(cycle(&mut s).await, Emission::Held(_)));
    assert_eq!(cycle(&mut s).await, Emission::NoTarget);
    assert!(s.last_sample().is_none());
}

#[tokio::test]
async fn test_reacquired_face_replaces_held_sample() {
    let (mut s, _) = scripted_scheduler(
        vec![
            DetectorStep::face(40.0, 50.0, 60.0, 50.0),
            DetectorStep::NoFace,
            DetectorStep::face(20.0, 30.0, 40.0, 30.0),
        ],
        100,
        100,
        SchedulerConfig::default(),
    );
    s.start().unwrap();

    let first = cycle(&mut s).await.sample().unwrap();
    cycle(&mut s).await;
    let second = cycle(&mut s).await;
    assert!(matches!(second, Emission::Fresh(_)));
    assert_ne!(second.sample(), Some(first));
}

#[tokio::test(start_paused = true)]
async fn test_slow_detector_is_never_overlapped() {
    let detector = Arc::new(
        ScriptedDetector::new(vec![DetectorStep::face(40.0, 50.0, 60.0, 50.0); 5]).with_latency(Duration::from_millis(120)),
    );
    let mut s = DetectionScheduler::new(
        detector.clone(),
        Box::new(SyntheticCapture::new(640, 480)),
        SchedulerConfig::default(),
    );
    s.start().unwrap();

    // Ticks at 60 fps while each detection takes ~7 frames
    for _ in 0..60 {
        s.tick().await;
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
    assert_eq!(detector.max_concurrent(), 1);
    assert!(detector.calls() >= 5);
    assert!(detector.calls() < 60);
}

#[tokio::test(start_paused = true)]
async fn test_frame_skip_sets_detection_cadence() {
    for (frame_skip, expected) in [(1, 60), (2, 30), (3, 20)] {
        let config = SchedulerConfig {
            frame_skip,
            ..SchedulerConfig::default()
        };
        let (mut s, detector) = scripted_scheduler(vec![], 100, 100, config);
        s.start().unwrap();
        for _ in 0..60 {
            s.tick().await;
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
        assert_eq!(detector.calls(), expected, "frame_skip {}", frame_skip);
    }
}

#[tokio::test]
async fn test_start_rejected_when_capture_unavailable() {
    let mut s = DetectionScheduler::new(
        Arc::new(ScriptedDetector::new(vec![])),
        Box::new(SyntheticCapture::unavailable()),
        SchedulerConfig::default(),
    );
    assert!(matches!(s.start(), Err(Error::Capture(_))));
    assert!(!s.is_running());
    assert_eq!(s.tick().await, Emission::Idle);
}

#[tokio::test]
async fn test_stop_releases_capture_once() {
    let capture = SyntheticCapture::new(100, 100);
    let probe = capture.probe();
    let mut s = DetectionScheduler::new(
        Arc::new(ScriptedDetector::new(vec![])),
        Box::new(capture),
        SchedulerConfig::default(),
    );
    s.start().unwrap();
    s.start().unwrap();
    assert!(probe.is_active());
    assert_eq!(probe.starts(), 1);

    // One detection pulls one frame
    s.tick().await;
    assert_eq!(probe.frames(), 1);

    assert_eq!(s.stop(), Emission::NoTarget);
    assert_eq!(s.stop(), Emission::NoTarget);
    assert!(!probe.is_active());
    assert_eq!(probe.stops(), 1);
}

#[tokio::test]
async fn test_zero_surface_counts_as_miss() {
    let (mut s, detector) = scripted_scheduler(vec![], 0, 0, SchedulerConfig::default());
    s.start().unwrap();
    assert_eq!(s.tick().await, Emission::Pending);
    assert_eq!(s.tick().await, Emission::NoTarget);
    assert_eq!(detector.calls(), 0);
}
