//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::dsp::filter::SVFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.37).sin()).collect();
        let mut buffer = input.clone();

        let mut lowpass = SVFilter::lowpass(1_000.0);
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                lowpass.render(black_box(&mut buffer), 48_000.0);
            })
        });

        let mut bandpass = SVFilter::bandpass(1_300.0);
        bandpass.set_q(4.0);
        group.bench_with_input(BenchmarkId::new("bandpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                bandpass.render(black_box(&mut buffer), 48_000.0);
            })
        });

        // Acid-style sweep: coefficients recomputed per sample
        let cutoffs: Vec<f32> = (0..size)
            .map(|i| 400.0 * (5.0f32).powf(i as f32 / size as f32))
            .collect();
        let mut swept = SVFilter::lowpass(400.0);
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                swept.render_swept(black_box(&mut buffer), black_box(&cutoffs), 48_000.0);
            })
        });
    }

    group.finish();
}
