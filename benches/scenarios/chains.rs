//! Benchmarks for oscillator into delay chains.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sinc_dsp::graph::{
    chorus::ChorusNode,
    delay::DelayNode,
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
    oscillator::OscNode,
};

use crate::BLOCK_SIZES;

pub fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chains");
    let sample_rate = 48_000.0;
    let ctx = RenderCtx::from_freq(sample_rate, 220.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Saw through a chorus: per-sample kernel rebuild at 32 taps
        let mut chorus = OscNode::sawtooth().through(ChorusNode::new(sample_rate, 0.8, 3.0, 0.5));
        chorus.reset(&ctx);
        group.bench_with_input(BenchmarkId::new("saw_chorus", size), &size, |b, _| {
            b.iter(|| chorus.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // Triangle with vibrato
        let mut vibrato = OscNode::triangle().through(ChorusNode::vibrato(sample_rate, 5.0, 30.0));
        vibrato.reset(&ctx);
        group.bench_with_input(BenchmarkId::new("triangle_vibrato", size), &size, |b, _| {
            b.iter(|| vibrato.render_block(black_box(&mut buffer), black_box(&ctx)))
        });

        // Square into a long static fractional delay, 64 taps
        let mut echo = OscNode::square()
            .through(DelayNode::new(sample_rate, 500.0).with_delay_ms(250.3));
        echo.reset(&ctx);
        group.bench_with_input(BenchmarkId::new("square_delay", size), &size, |b, _| {
            b.iter(|| echo.render_block(black_box(&mut buffer), black_box(&ctx)))
        });
    }

    group.finish();
}
