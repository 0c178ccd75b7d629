//! Benchmarks for the recursive sine generators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sinc_dsp::dsp::recursive_sine::{BiquadSine, ReinschSine, SineGenerator, StableQuadrature};

use crate::BLOCK_SIZES;

pub fn bench_sine(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/sine");
    let freq = 440.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Reference: one transcendental call per sample
        group.bench_with_input(BenchmarkId::new("std_sin", size), &size, |b, _| {
            let mut phase = 0.0f64;
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = (std::f64::consts::TAU * phase).sin();
                    phase = (phase + freq).fract();
                }
                black_box(&buffer);
            })
        });

        let mut biquad = BiquadSine::new(freq, 0.0);
        group.bench_with_input(BenchmarkId::new("biquad", size), &size, |b, _| {
            b.iter(|| biquad.render(black_box(&mut buffer)))
        });

        let mut reinsch = ReinschSine::new(freq, 0.0);
        group.bench_with_input(BenchmarkId::new("reinsch", size), &size, |b, _| {
            b.iter(|| reinsch.render(black_box(&mut buffer)))
        });

        let mut quadrature = StableQuadrature::new(freq, 0.0);
        group.bench_with_input(BenchmarkId::new("quadrature", size), &size, |b, _| {
            b.iter(|| quadrature.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
