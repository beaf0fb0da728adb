//! Benchmarks for the FFT analyser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::dsp::analyser::{Analyser, FFT_SIZE, FREQUENCY_BINS};

use crate::BLOCK_SIZES;

pub fn bench_analyser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/analyser");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut analyser = Analyser::new();

        group.bench_with_input(BenchmarkId::new("push", size), &size, |b, _| {
            b.iter(|| analyser.push(black_box(&input)))
        });
    }

    let signal: Vec<f32> = (0..FFT_SIZE).map(|i| (i as f32 * 0.05).sin()).collect();
    let mut analyser = Analyser::new();
    analyser.push(&signal);
    let mut bins = [0u8; FREQUENCY_BINS];
    group.bench_function("frequency_data", |b| {
        b.iter(|| analyser.frequency_data(black_box(&mut bins)))
    });

    group.finish();
}
