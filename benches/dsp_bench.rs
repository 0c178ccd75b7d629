//! Benchmarks for DSP primitives and real-world chains.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure the cost of the recurrences, kernel builds and
//! oscillators to make sure they stay well within real-time audio deadlines.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (sine recurrences, FIR build, resampler, oscillators)
//!   - scenarios/*  Oscillator into modulated delay chains

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_sine,
    dsp::bench_fir,
    dsp::bench_resampler,
    dsp::bench_oscillator,
    // Real-world scenarios
    scenarios::bench_chains,
);
criterion_main!(benches);
