//! Property-style tests for the conditioning pipeline under noisy input


use gaze_parallax::conditioning::{ConditioningConfig, ConditioningPipeline, ControlSignal, Outputs};
use gaze_parallax::filters::deadzone::AxisGate;
use gaze_parallax::normalizer::{NormalizedPosition, NormalizedSample};
use test_helpers::{assert_within, noisy_samples, random_samples};

#[test]
fn test_output_within_input_hull() {
    let mut pipeline = ConditioningPipeline::new(ConditioningConfig::default());
    let samples = random_samples(500);

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_d, mut max_d) = (f64::INFINITY, f64::NEG_INFINITY);

    for sample in samples {
        min_x = min_x.min(sample.position.x);
        max_x = max_x.max(sample.position.x);
        min_y = min_y.min(sample.position.y);
        max_y = max_y.max(sample.position.y);
        min_d = min_d.min(sample.distance);
        max_d = max_d.max(sample.distance);

        let signal = pipeline.process(sample).signal;
        let position = signal.position.unwrap();
        assert_within(position.x, min_x, max_x);
        assert_within(position.y, min_y, max_y);
        assert_within(signal.distance.unwrap(), min_d, max_d);
    }
}

#[test]
fn test_hull_restarts_after_reset() {
    let mut pipeline = ConditioningPipeline::new(ConditioningConfig::default());
    for sample in noisy_samples(50, -0.9, -0.9, 0.05) {
        pipeline.process(sample);
    }
    pipeline.reset();

    // Nothing from before the reset leaks into the new hull
    for sample in noisy_samples(50, 0.7, 0.6, 0.0) {
        let position = pipeline.process(sample).signal.position.unwrap();
        assert_within(position.x, 0.7, 0.7);
        assert_within(position.y, 0.6, 0.6);
    }
}

#[test]
fn test_constant_input_converges_and_goes_quiet() {
    let mut pipeline = ConditioningPipeline::new(ConditioningConfig::default());
    let start = NormalizedSample {
        position: NormalizedPosition::new(-0.6, 0.4),
        distance: 0.05,
    };
    let target = NormalizedSample {
        position: NormalizedPosition::new(0.3, -0.2),
        distance: 0.12,
    };
    pipeline.process(start);

    for _ in 0..500 {
        pipeline.process(target);
    }
    let settled = pipeline.current();

    for _ in 0..100 {
        let update = pipeline.process(target);
        assert!(!update.position_changed);
        assert!(!update.distance_changed);
        assert_eq!(update.signal, settled);
    }

    let position = settled.position.unwrap();
    assert!((position.x - 0.3).abs() < 0.005 + 1e-9);
    assert!((position.y + 0.2).abs() < 0.005 + 1e-9);
}

#[test]
fn test_sub_threshold_jitter_is_bit_identical() {
    let mut pipeline = ConditioningPipeline::new(ConditioningConfig::default());
    let first = pipeline
        .process(NormalizedSample {
            position: NormalizedPosition::new(0.25, 0.25),
            distance: 0.1,
        })
        .signal;

    // Raw jitter of 0.02 moves the smoothed value by at most 0.002 per step
    for sample in noisy_samples(5, 0.25, 0.25, 0.02) {
        let signal = pipeline.process(sample).signal;
        let (a, b) = (first.position.unwrap(), signal.position.unwrap());
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
    }
}

#[test]
fn test_single_axis_motion_depends_on_gate() {
    let moving = |gate: AxisGate| {
        let mut pipeline = ConditioningPipeline::new(ConditioningConfig {
            axis_gate: gate,
            ..ConditioningConfig::default()
        });
        pipeline.process(NormalizedSample {
            position: NormalizedPosition::new(0.0, 0.0),
            distance: 0.1,
        });
        // Large horizontal move, no vertical move
        pipeline
            .process(NormalizedSample {
                position: NormalizedPosition::new(0.5, 0.0),
                distance: 0.1,
            })
            .position_changed
    };

    assert!(moving(AxisGate::Any));
    assert!(!moving(AxisGate::All));
}

#[test]
fn test_position_only_never_reports_distance() {
    let mut pipeline = ConditioningPipeline::new(ConditioningConfig {
        outputs: Outputs::PositionOnly,
        ..ConditioningConfig::default()
    });
    for sample in random_samples(50) {
        let update = pipeline.process(sample);
        assert!(update.signal.distance.is_none());
        assert!(!update.distance_changed);
    }
    assert_eq!(pipeline.reset().signal, ControlSignal::NEUTRAL);
}
