//! Benchmarks for complete instrument voices.
//!
//! Each voice is built by the factory from a mapped shape, exactly as the
//! scheduler builds it, then rendered block by block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use synesthesia::{
    buffers::BufferLibrary,
    graph::{GraphNode, RenderCtx},
    instruments::build_voice,
    mapping::{MappedShape, ParameterMapper},
    Instrument, Point, ReferenceCanvas, Rgb, Shape,
};

use crate::BLOCK_SIZES;

fn mapped(kind: Instrument, y: f32) -> MappedShape {
    let shape = Shape::new(
        kind,
        vec![Point::new(100.0, y - 20.0), Point::new(300.0, y + 20.0)],
        Rgb::new(200, 0, 160),
    )
    .expect("two points");
    ParameterMapper::new(ReferenceCanvas::default()).map(&shape, shape.color())
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::new(48_000.0, 0.0);

    let mut buffers = BufferLibrary::new();
    buffers.initialize(48_000.0, None);

    let cases = [
        ("synth_kick", mapped(Instrument::Ellipse, 370.0)),
        ("noise_hat", mapped(Instrument::Ellipse, 40.0)),
        ("acid_bass", mapped(Instrument::Squiggle, 200.0)),
        ("dub_stab", mapped(Instrument::Line, 200.0)),
        ("square_lead", mapped(Instrument::Freehand, 200.0)),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, shape) in &cases {
            let Some(mut voice) = build_voice(shape, &buffers, 0.0) else {
                continue;
            };
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    voice.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
