//! Benchmarks for windowed-sinc kernel construction.
//!
//! The resampler rebuilds its kernel every sample, so this is the inner cost
//! of every modulated delay.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sinc_dsp::dsp::{
    sinc::{build_fir_with, Evaluation},
    window::WindowKind,
};

const KERNEL_LENGTHS: &[usize] = &[8, 32, 128, 256];

pub fn bench_fir(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fir");
    let windows = [
        WindowKind::BlackmanHarris,
        WindowKind::Hann,
        WindowKind::lanczos(4.0),
    ];

    for &len in KERNEL_LENGTHS {
        let mut fir = vec![0.0f64; len];

        for window in windows {
            for (label, evaluation) in [
                ("direct", Evaluation::Direct),
                ("recursive", Evaluation::Recursive),
            ] {
                group.bench_with_input(
                    BenchmarkId::new(format!("{}_{label}", window.name()), len),
                    &len,
                    |b, _| {
                        b.iter(|| {
                            build_fir_with(
                                black_box(&mut fir),
                                black_box(0.45),
                                black_box(0.37),
                                window,
                                evaluation,
                            );
                        })
                    },
                );
            }
        }
    }

    group.finish();
}
