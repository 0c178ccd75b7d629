//! Benchmarks for low-level DSP primitives.

mod delay;
mod fir;
mod oscillator;
mod sine;

pub use delay::bench_resampler;
pub use fir::bench_fir;
pub use oscillator::bench_oscillator;
pub use sine::bench_sine;
