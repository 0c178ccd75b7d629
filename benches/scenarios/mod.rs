//! Real-world scenario benchmarks.
//!
//! Complete graph chains: an oscillator feeding a modulated resampler.

mod chains;

pub use chains::bench_chains;
