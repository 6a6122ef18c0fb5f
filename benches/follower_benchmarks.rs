//! Benchmarks for the per-frame camera follower

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_parallax::{
    follower::{CameraConfig, CameraFollower, FollowMode, SensitivityCurve},
    normalizer::NormalizedPosition,
};

fn benchmark_follower(c: &mut Criterion) {
    let mut group = c.benchmark_group("follower");

    let targets: Vec<NormalizedPosition> = (0..100)
        .map(|_| NormalizedPosition::new(rand::random::<f64>() * 2.0 - 1.0, rand::random::<f64>() * 2.0 - 1.0))
        .collect();

    for mode in [FollowMode::Gaze, FollowMode::Orbit] {
        let config = CameraConfig {
            mode,
            ..CameraConfig::default()
        };
        let mut follower = CameraFollower::new(&config).unwrap();
        let name = format!("{mode:?}");

        group.bench_with_input(BenchmarkId::new("tick_100", &name), &targets, |b, targets| {
            b.iter(|| {
                for &target in targets {
                    black_box(follower.tick(black_box(Some(target))));
                }
            });
        });
    }

    // Zoom changes every frame, so the sensitivity cache misses each time
    let mut follower = CameraFollower::new(&CameraConfig::default()).unwrap();
    group.bench_function("tick_with_scroll", |b| {
        let mut direction = 1.0;
        b.iter(|| {
            if follower.scroll(direction * 10.0) >= 12.0 || follower.zoom().zoom() <= 3.0 {
                direction = -direction;
            }
            black_box(follower.tick(Some(NormalizedPosition::new(0.2, 0.1))))
        });
    });

    group.bench_function("curve_evaluate", |b| {
        let curve = SensitivityCurve::default();
        b.iter(|| black_box(curve.evaluate(black_box(0.37))));
    });

    group.finish();
}

criterion_group!(benches, benchmark_follower);
criterion_main!(benches);
