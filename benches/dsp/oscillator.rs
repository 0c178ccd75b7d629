//! Benchmarks for band-limited oscillator strategies.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use sinc_dsp::dsp::{
    oscillator::{Oscillator, OscillatorBlock, OscillatorWaveform},
    residual::ResidualOrder,
    wavetable::{Mipmap, DEFAULT_TABLE_SIZE},
};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let freq = 440.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine - stable quadrature recurrence, no transcendental calls
        let mut osc = OscillatorBlock::sine();
        osc.reset(freq, 0.0);
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });

        // Residual corrections - cost grows with the point count
        for order in [ResidualOrder::Four, ResidualOrder::Eight] {
            for waveform in [OscillatorWaveform::Saw, OscillatorWaveform::Triangle] {
                let mut osc = OscillatorBlock::residual(waveform, order);
                osc.reset(freq, 0.0);
                group.bench_with_input(
                    BenchmarkId::new(format!("{}_{}pt", waveform.name(), order.points()), size),
                    &size,
                    |b, _| b.iter(|| osc.render(black_box(&mut buffer))),
                );
            }
        }

        // Wavetable - cubic lookup with an octave crossfade
        let mipmap = Arc::new(Mipmap::new(OscillatorWaveform::Saw, DEFAULT_TABLE_SIZE));
        let mut osc = OscillatorBlock::wavetable(mipmap);
        osc.reset(freq, 0.0);
        group.bench_with_input(BenchmarkId::new("wavetable_saw", size), &size, |b, _| {
            b.iter(|| osc.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
