//! Benchmarks for oscillator waveforms.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let waveforms = [
        ("sine", OscillatorWaveform::Sine),
        ("sawtooth", OscillatorWaveform::Sawtooth),
        ("square", OscillatorWaveform::Square),
    ];

    for &size in BLOCK_SIZES {
        let mut output = vec![0.0f32; size];
        // Top of the scale, where PolyBLEP does the most work
        let frequencies = vec![523.25f32; size];

        for (name, waveform) in waveforms {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut output), black_box(&frequencies), 48_000.0);
                })
            });
        }
    }

    group.finish();
}
