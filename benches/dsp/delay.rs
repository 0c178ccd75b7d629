//! Benchmarks for the resampling delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sinc_dsp::dsp::delay::{Interpolation, Resampler};

use crate::BLOCK_SIZES;

pub fn bench_resampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resampler");

    // Tap counts follow the delay, so short delays are cheaper
    let delays: &[f64] = &[
        3.5,     // 8 taps
        16.25,   // 32 taps
        480.75,  // 10ms at 48kHz, full 256 taps
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay in delays {
            let mut resampler = Resampler::new(1024, 256);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("static_{}", delay as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        resampler.render(black_box(&mut buffer), black_box(delay));
                    })
                },
            );
        }

        // Polynomial readers at the long delay, for comparison with the kernel
        for (name, interpolation) in [
            ("integer", Interpolation::Integer),
            ("linear", Interpolation::Linear),
            ("cubic", Interpolation::Cubic),
        ] {
            let mut resampler = Resampler::new(1024, 256).with_interpolation(interpolation);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    resampler.render(black_box(&mut buffer), black_box(480.75));
                })
            });
        }

        // Chorus-like modulation: fractional delay moves every sample
        let sweep: Vec<f64> = (0..size)
            .map(|i| 480.0 + (i as f64 * 0.01).sin() * 48.0)
            .collect();
        let mut resampler = Resampler::new(1024, 32);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                resampler.render_modulated(black_box(&mut buffer), black_box(&sweep));
            })
        });
    }

    group.finish();
}
