//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with the ergonomics needed
//! for block-based rendering: sample-rate handling, Hz and millisecond
//! parameters, and serial chaining. The `extensions` module adds a fluent
//! `.through()` so chains read left to right.

/// Modulated delay: chorus and vibrato.
pub mod chorus;
/// Fractional delay node backed by the resampler.
pub mod delay;
/// Fluent combinators (`.through()`).
pub mod extensions;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;
