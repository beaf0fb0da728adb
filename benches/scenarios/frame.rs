//! Benchmarks for a crowded canvas: mixing many live voices through the
//! context, and the scheduler's per-frame step over many shapes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::{
    buffers::BufferLibrary,
    context::AudioContext,
    mapping::{MappedShape, ParameterMapper},
    scheduler::LoopScheduler,
    Instrument, LoopDuration, Point, ReferenceCanvas, Rgb, Shape,
};

use crate::BLOCK_SIZES;

const SHAPE_COUNTS: &[usize] = &[8, 32, 128];

/// `count` shapes spread over the canvas, all overlapping the loop start.
fn canvas(count: usize) -> Vec<MappedShape> {
    let mapper = ParameterMapper::new(ReferenceCanvas::default());
    (0..count)
        .map(|i| {
            let kind = Instrument::ALL[i % Instrument::ALL.len()];
            let y = (i * 37 % 380) as f32 + 10.0;
            let x = (i * 3 % 40) as f32;
            let shape = Shape::new(
                kind,
                vec![Point::new(x, y), Point::new(x + 400.0, y + 10.0)],
                Rgb::new((i * 29 % 256) as u8, 0, (i * 53 % 256) as u8),
            )
            .expect("two points");
            mapper.map(&shape, shape.color())
        })
        .collect()
}

fn running() -> (AudioContext, LoopScheduler, BufferLibrary) {
    let mut context = AudioContext::new(48_000.0, 0.8);
    let mut buffers = BufferLibrary::new();
    buffers.initialize(48_000.0, None);
    let mut scheduler = LoopScheduler::new(LoopDuration::default(), 800.0);
    scheduler.start(&mut context);
    (context, scheduler, buffers)
}

pub fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/frame");

    for &count in SHAPE_COUNTS {
        let shapes = canvas(count);

        // Steady state: every voice already registered, nothing to start
        let (mut context, mut scheduler, buffers) = running();
        scheduler.step(&mut context, &shapes, &buffers);
        group.bench_with_input(BenchmarkId::new("step", count), &count, |b, _| {
            b.iter(|| scheduler.step(black_box(&mut context), black_box(&shapes), &buffers))
        });

        for &size in BLOCK_SIZES {
            let (mut context, mut scheduler, buffers) = running();
            scheduler.step(&mut context, &shapes, &buffers);
            let mut out = vec![0.0f32; size];
            group.bench_with_input(
                BenchmarkId::new(format!("render_{count}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        // Percussion ends after its decay; oscillator voices keep sounding
                        context.render(black_box(&mut out));
                    })
                },
            );
        }
    }

    group.finish();
}
