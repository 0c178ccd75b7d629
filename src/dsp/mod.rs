//! Low-level DSP primitives: recurrences, kernels, delay lines and oscillators.
//!
//! Everything here is allocation-free once constructed and safe to call from
//! an audio callback. Parameters are clamped into their valid range rather
//! than rejected, so the sample loop never branches on errors.

/// Fractional delay line with an adaptive windowed-sinc reader.
pub mod delay;
/// Hz / cycles-per-sample / MIDI conversions and LFO helpers.
pub mod lfo;
/// Oscillator trait, pure recursive sine, and strategy dispatch.
pub mod oscillator;
/// PolyBLEP / PolyBLAMP corrected saw, square and triangle.
pub mod polyblep;
/// Biquad, Reinsch and stable-quadrature sine recurrences.
pub mod recursive_sine;
/// Residual polynomial coefficient tables.
pub mod residual;
/// Windowed-sinc fractional-delay kernel.
pub mod sinc;
/// Mipmapped wavetables with cubic lookup.
pub mod wavetable;
/// Cosine-sum, Bartlett and Lanczos windows.
pub mod window;

pub use delay::Resampler;
pub use oscillator::{Oscillator, OscillatorBlock, OscillatorWaveform};
pub use recursive_sine::{SineGenerator, StableQuadrature};
pub use window::WindowKind;

/// Evaluate a polynomial with ascending-power coefficients.
#[inline]
pub(crate) fn horner(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
