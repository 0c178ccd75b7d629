//! Windowed-sinc fractional-delay FIR kernel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::{PI, TAU};

use crate::dsp::{
    recursive_sine::StableQuadrature,
    window::{WindowGenerator, WindowKind},
};

/*
Fractional-Delay Windowed Sinc
==============================

An ideal lowpass with cutoff f_c (cycles/sample) has the impulse response

  h(x) = sin(2π·f_c·x) / (π·x)                 ("modified sinc", h(0) = 2·f_c)

Delaying that response by a fraction of a sample is just a matter of where
the taps sample it. For an L-tap kernel and fractional delay d, tap i sits at

  x_i = i − m,   m = ⌊L/2⌋ − d

so the kernel's center moves continuously with d. No table, no interpolation
of precomputed kernels.

  d = 0.0:   taps at ... −2 −1  0  1  2 ...   (center tap hits the peak)
  d = 0.5:   taps at ... −1.5 −0.5 0.5 1.5 ... (two equal taps straddle it)

Each tap is multiplied by a window (see `window.rs`) and the kernel is then
scaled so its taps sum to exactly 1. That keeps DC gain at unity whatever the
window and cutoff.


Two evaluation strategies
-------------------------

  Direct      sin(2π·f_c·x_i) per tap.
  Recursive   a stable quadrature recurrence at ω = 2π·f_c starting from phase
              −ω·m yields sin(ω·x_i) for consecutive i with three multiplies
              per tap. The window runs on a second recurrence.

Both share the same singularity rule and agree to ~1e-13.


The x = 0 singularity
---------------------

sin(ωx)/(πx) is 0/0 at x = 0 and loses precision near it. For |x| ≤ 0.1 the
sinc is replaced by a [2/2] Padé approximant

  h(x) ≈ (2/3)·f_c·(15 − 7q)/(5 + q),   q = (π·f_c·x)²

which matches the true value to ~2e-7 at the switchover for f_c = 0.5 and far
better for lower cutoffs.


Cutoff when reading faster than real time
-----------------------------------------

A delay line whose read head advances r input samples per output sample is a
downsampler by r. Anything above 0.5/r aliases. The reader lowers the kernel
cutoff to 2^(−r) when r > 1; see `cutoff_for_read_rate`.
*/

/// Offsets at or below this use the Padé approximant.
pub const PADE_THRESHOLD: f64 = 0.1;

/// Lowest cutoff the kernel accepts.
pub const MIN_CUTOFF: f64 = f64::EPSILON;

/// Highest cutoff (Nyquist).
pub const MAX_CUTOFF: f64 = 0.5;

/// How kernel taps are evaluated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Evaluation {
    /// `sin`/`cos` per tap.
    Direct,
    /// Quadrature recurrences walked across the taps.
    #[default]
    Recursive,
}

/// `sin(y)/y` near zero, [2/2] Padé in `q = (y/2)²`.
#[inline]
pub fn sinc_pade(y: f64) -> f64 {
    let q = 0.25 * y * y;
    (15.0 - 7.0 * q) / (3.0 * (5.0 + q))
}

/// Padé form of [`modified_sinc`], valid for small `x`.
#[inline]
pub fn pade_sinc(x: f64, cutoff: f64) -> f64 {
    2.0 * cutoff * sinc_pade(TAU * cutoff * x)
}

/// Lowpass impulse response `sin(2π·f_c·x)/(π·x)`.
#[inline]
pub fn modified_sinc(x: f64, cutoff: f64) -> f64 {
    if x.abs() <= PADE_THRESHOLD {
        pade_sinc(x, cutoff)
    } else {
        (TAU * cutoff * x).sin() / (PI * x)
    }
}

/// Clamp into `(ε, 0.5]`. NaN maps to the minimum.
#[inline]
pub fn clamp_cutoff(cutoff: f64) -> f64 {
    if cutoff > MIN_CUTOFF {
        cutoff.min(MAX_CUTOFF)
    } else {
        MIN_CUTOFF
    }
}

/// Kernel cutoff for a read head moving `rate` input samples per output sample.
#[inline]
pub fn cutoff_for_read_rate(rate: f64) -> f64 {
    if rate <= 1.0 {
        MAX_CUTOFF
    } else {
        clamp_cutoff((-rate).exp2())
    }
}

/// Tap offset of the kernel center for `len` taps and fractional delay `fraction`.
#[inline]
pub fn kernel_center(len: usize, fraction: f64) -> f64 {
    (len / 2) as f64 - fraction
}

/// Fill `fir` with a windowed-sinc fractional-delay kernel, using recurrences.
///
/// The kernel length is `fir.len()`. Fewer than two taps yields the identity
/// kernel. The returned slice is `fir` itself.
///
/// ```
/// use sinc_dsp::dsp::{sinc::build_fir, window::WindowKind};
///
/// let mut taps = [0.0; 16];
/// let h = build_fir(&mut taps, 0.5, 0.0, WindowKind::BlackmanHarris);
/// assert!((h[8] - 1.0).abs() < 1e-6);
/// ```
pub fn build_fir(fir: &mut [f64], cutoff: f64, fraction: f64, window: WindowKind) -> &[f64] {
    build_fir_with(fir, cutoff, fraction, window, Evaluation::Recursive)
}

/// [`build_fir`] with an explicit evaluation strategy.
pub fn build_fir_with(
    fir: &mut [f64],
    cutoff: f64,
    fraction: f64,
    window: WindowKind,
    evaluation: Evaluation,
) -> &[f64] {
    let len = fir.len();
    if len < 2 {
        fir.fill(1.0);
        return fir;
    }

    let cutoff = clamp_cutoff(cutoff);
    let center = kernel_center(len, fraction);

    match evaluation {
        Evaluation::Direct => fill_direct(fir, cutoff, center, window),
        Evaluation::Recursive => fill_recursive(fir, cutoff, center, window),
    }

    normalize_dc(fir);
    fir
}

fn fill_direct(fir: &mut [f64], cutoff: f64, center: f64, window: WindowKind) {
    let len = fir.len();
    for (i, tap) in fir.iter_mut().enumerate() {
        let x = i as f64 - center;
        *tap = modified_sinc(x, cutoff) * window.evaluate(i, len, x, cutoff);
    }
}

fn fill_recursive(fir: &mut [f64], cutoff: f64, center: f64, window: WindowKind) {
    let omega = TAU * cutoff;
    let mut body = StableQuadrature::from_angular(omega, -omega * center);
    let mut shape = WindowGenerator::new(window, fir.len(), center, cutoff);

    for (i, tap) in fir.iter_mut().enumerate() {
        let x = i as f64 - center;
        let (s, _) = body.step_quadrature();
        let sinc = if x.abs() <= PADE_THRESHOLD {
            pade_sinc(x, cutoff)
        } else {
            s / (PI * x)
        };
        *tap = sinc * shape.next(i, x);
    }
}

fn normalize_dc(fir: &mut [f64]) {
    let sum: f64 = fir.iter().sum();
    if sum.is_normal() {
        let gain = sum.recip();
        fir.iter_mut().for_each(|tap| *tap *= gain);
    }
}
