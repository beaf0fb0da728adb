//! Benchmarks for waveshaping distortion.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::dsp::DistortionCurve;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    group.bench_function("build_curve", |b| {
        b.iter(|| DistortionCurve::new(black_box(60.0)))
    });

    let Some(curve) = DistortionCurve::new(110.0) else {
        group.finish();
        return;
    };

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        group.bench_with_input(BenchmarkId::new("shape_buffer", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                curve.shape_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
