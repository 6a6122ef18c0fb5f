//! Benchmarks for the per-sample conditioning path

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_parallax::{
    conditioning::{ConditioningConfig, ConditioningPipeline},
    detection::EyeSample,
    filters::{create_filter, deadzone::AxisGate},
    normalizer::{CoordinateNormalizer, NormalizedPosition, NormalizedSample},
    simulation::landmarks_at,
};

fn noisy_samples(n: usize) -> Vec<NormalizedSample> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.05;
            NormalizedSample {
                position: NormalizedPosition::new(
                    0.5 * t.sin() + 0.01 * rand::random::<f64>(),
                    0.3 * t.cos() + 0.01 * rand::random::<f64>(),
                ),
                distance: 0.08 + 0.002 * rand::random::<f64>(),
            }
        })
        .collect()
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditioning");
    let data = noisy_samples(100);

    let configs = [
        ("default", ConditioningConfig::default()),
        (
            "all_axes_gate",
            ConditioningConfig {
                axis_gate: AxisGate::All,
                ..ConditioningConfig::default()
            },
        ),
    ];

    for (name, config) in configs {
        let mut pipeline = ConditioningPipeline::new(config);
        group.bench_with_input(BenchmarkId::new("single_sample", name), &data[0], |b, &sample| {
            b.iter(|| black_box(pipeline.process(black_box(sample))));
        });

        group.bench_with_input(BenchmarkId::new("sequence_100", name), &data, |b, data| {
            b.iter(|| {
                pipeline.reset();
                for &sample in data {
                    black_box(pipeline.process(black_box(sample)));
                }
            });
        });
    }

    for spec in ["none", "exponential:0.05", "exponential:0.2"] {
        let filter = match create_filter(spec) {
            Ok(filter) => filter,
            Err(e) => panic!("bad filter {spec}: {e}"),
        };
        let mut pipeline = ConditioningPipeline::with_position_filter(ConditioningConfig::default(), filter);
        group.bench_with_input(BenchmarkId::new("position_filter", spec), &data, |b, data| {
            b.iter(|| {
                pipeline.reset();
                for &sample in data {
                    black_box(pipeline.process(black_box(sample)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_normalization(c: &mut Criterion) {
    let mut normalizer = CoordinateNormalizer::new();
    normalizer.update_surface(1280, 720);
    let sample = EyeSample::from_landmarks(&landmarks_at((600.0, 340.0), (680.0, 342.0))).unwrap();

    c.bench_function("eye_sample_from_landmarks", |b| {
        let landmarks = landmarks_at((600.0, 340.0), (680.0, 342.0));
        b.iter(|| black_box(EyeSample::from_landmarks(black_box(&landmarks))));
    });

    c.bench_function("normalize_sample", |b| {
        b.iter(|| {
            normalizer.update_surface(black_box(1280), black_box(720));
            black_box(normalizer.normalize(black_box(&sample)))
        });
    });
}

criterion_group!(benches, benchmark_pipeline, benchmark_normalization);
criterion_main!(benches);
