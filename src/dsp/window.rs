//! Window functions for the fractional-delay sinc kernel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::{PI, TAU};

use crate::dsp::{
    horner,
    recursive_sine::StableQuadrature,
    sinc::{sinc_pade, MAX_CUTOFF, MIN_CUTOFF, PADE_THRESHOLD},
};

/*
Windows
=======

A truncated sinc rings: cutting it off after L taps leaves a rectangular
window whose sidelobes leak into the stopband. Multiplying by a smooth window
trades a wider transition band for far lower sidelobes.

Two families are supported.

Cosine-sum windows
------------------

  W(θ) = a0 − a1·cos θ + a2·cos 2θ − a3·cos 3θ + ...,   θ_i = 2π(i + 1)/(L + 1)

Expanding cos kθ as Chebyshev polynomials of c = cos θ turns every member of
the family into a plain polynomial in c. Only cos θ has to be generated per tap
(by a second quadrature recurrence) and the window kind only chooses a row of
coefficients:

  Hann               0.5 − 0.5c
  Blackman           0.3497 − 0.4966c + 0.1537c²
  Nuttall            ... degree 3
  Blackman-Harris    ... degree 3
  Blackman-Nuttall   ... degree 3
  Flattop            ... degree 4

The θ grid runs over i + 1 so the window reaches zero one tap outside the
kernel on both ends and stays symmetric about (L − 1)/2.

Shape windows
-------------

  Bartlett   1 − |2(i + 1) − (L + 1)| / (L + 1)         (no trig at all)
  Lanczos    sinc(2·f_c·x/a) for |x| < a/(2·f_c), else 0,   x = i − m

Lanczos follows the continuous tap position x, so it slides with the
fractional delay just like the sinc body. Its width is tied to the cutoff: the
window always covers `a` lobes of the sinc on each side, so lowering f_c
stretches it along with the body. At f_c = 0.5 it is the textbook
sinc(x/a). The generator is a second quadrature recurrence at
ω = 2π·f_c/a.
*/

/// Number of polynomial coefficients per cosine-sum row.
pub const COSINE_SUM_ORDER: usize = 5;

/// Cosine-sum windows as polynomials in `cos θ`, ascending powers.
///
/// Flat, row-major by window kind: rectangular, Hann, Blackman, Nuttall,
/// Blackman-Harris, Blackman-Nuttall, flattop.
#[rustfmt::skip]
pub static COSINE_SUM_TABLE: [f64; 7 * COSINE_SUM_ORDER] = [
    // rectangular
    1.0, 0.0, 0.0, 0.0, 0.0,
    // Hann
    0.5, -0.5, 0.0, 0.0, 0.0,
    // Blackman
    0.349742046431642, -0.496560619088564, 0.153697334479794, 0.0, 0.0,
    // Nuttall
    0.211536, -0.449584, 0.288464, -0.050416, 0.0,
    // Blackman-Harris
    0.21747, -0.45325, 0.28256, -0.04672, 0.0,
    // Blackman-Nuttall
    0.2269824, -0.4572542, 0.273199, -0.0425644, 0.0,
    // flattop
    -0.05473684, -0.165894739, 0.498947372, -0.334315788, 0.055578944,
];

/// Window applied to the sinc body.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WindowKind {
    Rectangular,
    Hann,
    Bartlett,
    Blackman,
    Nuttall,
    #[default]
    BlackmanHarris,
    BlackmanNuttall,
    Flattop,
    /// Lanczos window spanning `a` sinc lobes on each side of the center.
    Lanczos { a: f64 },
}

impl WindowKind {
    /// Every fixed-shape window, for sweeps in tests and benches.
    pub const FIXED: [WindowKind; 8] = [
        WindowKind::Rectangular,
        WindowKind::Hann,
        WindowKind::Bartlett,
        WindowKind::Blackman,
        WindowKind::Nuttall,
        WindowKind::BlackmanHarris,
        WindowKind::BlackmanNuttall,
        WindowKind::Flattop,
    ];

    pub fn lanczos(a: f64) -> Self {
        WindowKind::Lanczos { a }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hann => "hann",
            WindowKind::Bartlett => "bartlett",
            WindowKind::Blackman => "blackman",
            WindowKind::Nuttall => "nuttall",
            WindowKind::BlackmanHarris => "blackman-harris",
            WindowKind::BlackmanNuttall => "blackman-nuttall",
            WindowKind::Flattop => "flattop",
            WindowKind::Lanczos { .. } => "lanczos",
        }
    }

    /// Row of [`COSINE_SUM_TABLE`] for cosine-sum windows.
    pub fn cosine_sum_row(&self) -> Option<&'static [f64]> {
        let row = match self {
            WindowKind::Rectangular => 0,
            WindowKind::Hann => 1,
            WindowKind::Blackman => 2,
            WindowKind::Nuttall => 3,
            WindowKind::BlackmanHarris => 4,
            WindowKind::BlackmanNuttall => 5,
            WindowKind::Flattop => 6,
            WindowKind::Bartlett | WindowKind::Lanczos { .. } => return None,
        };
        let start = row * COSINE_SUM_ORDER;
        Some(&COSINE_SUM_TABLE[start..start + COSINE_SUM_ORDER])
    }

    /// Window value at tap `i` of `len`, where `x` is the tap's offset from
    /// the kernel center. Evaluated with `cos`/`sin` directly.
    ///
    /// `cutoff` only matters for Lanczos, whose width follows the sinc lobes.
    pub fn evaluate(&self, i: usize, len: usize, x: f64, cutoff: f64) -> f64 {
        match *self {
            WindowKind::Rectangular => 1.0,
            WindowKind::Bartlett => bartlett(i, len),
            WindowKind::Lanczos { a } => {
                let span = lanczos_span(a, cutoff);
                if x.abs() >= span {
                    return 0.0;
                }
                let y = PI * x / span;
                if x.abs() <= PADE_THRESHOLD {
                    sinc_pade(y)
                } else {
                    y.sin() / y
                }
            }
            _ => {
                let c = cosine_sum_angle(i, len).cos();
                horner(self.cosine_sum_row().unwrap_or(&[1.0]), c)
            }
        }
    }
}

#[inline]
fn cosine_sum_angle(i: usize, len: usize) -> f64 {
    TAU * (i + 1) as f64 / (len + 1) as f64
}

#[inline]
fn bartlett(i: usize, len: usize) -> f64 {
    let n = (len + 1).max(2) as f64;
    1.0 - (2.0 * (i + 1) as f64 - n).abs() / n
}

/// Half-width in taps of a Lanczos window covering `a` lobes at `cutoff`.
#[inline]
pub fn lanczos_span(a: f64, cutoff: f64) -> f64 {
    a.max(1.0) / (2.0 * cutoff.clamp(MIN_CUTOFF, MAX_CUTOFF))
}

/// Produces window values tap by tap from a recurrence instead of `cos`/`sin`.
#[derive(Debug, Clone)]
pub struct WindowGenerator {
    kind: WindowKind,
    len: usize,
    span: f64,
    row: &'static [f64],
    osc: StableQuadrature,
}

impl WindowGenerator {
    /// Prepare a walk over `len` taps for a kernel centered at `center` with
    /// the given sinc cutoff.
    pub fn new(kind: WindowKind, len: usize, center: f64, cutoff: f64) -> Self {
        let (span, osc) = match kind {
            WindowKind::Lanczos { a } => {
                let span = lanczos_span(a, cutoff);
                let omega = PI / span;
                (span, StableQuadrature::from_angular(omega, -omega * center))
            }
            WindowKind::Rectangular | WindowKind::Bartlett => (0.0, StableQuadrature::default()),
            _ => {
                let step = TAU / (len + 1) as f64;
                (0.0, StableQuadrature::from_angular(step, step))
            }
        };

        Self {
            kind,
            len,
            span,
            row: kind.cosine_sum_row().unwrap_or(&[1.0]),
            osc,
        }
    }

    /// Window value for tap `i` at offset `x`. Must be called for consecutive taps.
    #[inline]
    pub fn next(&mut self, i: usize, x: f64) -> f64 {
        match self.kind {
            WindowKind::Rectangular => 1.0,
            WindowKind::Bartlett => bartlett(i, self.len),
            WindowKind::Lanczos { .. } => {
                let (s, _) = self.osc.step_quadrature();
                if x.abs() >= self.span {
                    0.0
                } else if x.abs() <= PADE_THRESHOLD {
                    sinc_pade(PI * x / self.span)
                } else {
                    s * self.span / (PI * x)
                }
            }
            _ => {
                let (_, c) = self.osc.step_quadrature();
                horner(self.row, c)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_sum_windows_are_symmetric() {
        let len = 33;
        for kind in WindowKind::FIXED {
            for i in 0..len {
                let a = kind.evaluate(i, len, 0.0, 0.5);
                let b = kind.evaluate(len - 1 - i, len, 0.0, 0.5);
                assert!(
                    (a - b).abs() < 1e-12,
                    "{} not symmetric at tap {i}: {a} vs {b}",
                    kind.name()
                );
            }
        }
    }

    #[test]
    fn hann_peaks_at_center() {
        let len = 31;
        let center = WindowKind::Hann.evaluate(15, len, 0.0, 0.5);
        assert!((center - 1.0).abs() < 1e-12);
        assert!(WindowKind::Hann.evaluate(0, len, 0.0, 0.5) < 0.02);
    }

    #[test]
    fn bartlett_is_a_triangle() {
        let len = 7;
        let values: Vec<f64> = (0..len)
            .map(|i| WindowKind::Bartlett.evaluate(i, len, 0.0, 0.5))
            .collect();
        let expected = [0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25];
        for (got, want) in values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{values:?}");
        }
    }

    #[test]
    fn lanczos_vanishes_outside_width() {
        let kind = WindowKind::lanczos(3.0);
        assert_eq!(kind.evaluate(0, 16, -3.5, 0.5), 0.0);
        assert_eq!(kind.evaluate(15, 16, 3.0, 0.5), 0.0);
        assert!((kind.evaluate(8, 16, 0.0, 0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lanczos_stretches_with_cutoff() {
        let kind = WindowKind::lanczos(3.0);
        assert_eq!(lanczos_span(3.0, 0.125), 12.0);
        assert!(kind.evaluate(0, 64, 11.5, 0.125) > 0.0);
        assert_eq!(kind.evaluate(0, 64, 12.0, 0.125), 0.0);

        // A quarter of the cutoff covers the same lobes over four times the taps.
        for x in [0.5, 1.3, 2.0, 2.9] {
            let wide = kind.evaluate(0, 64, 4.0 * x, 0.125);
            let narrow = kind.evaluate(0, 64, x, 0.5);
            assert!((wide - narrow).abs() < 1e-12, "x={x}: {wide} vs {narrow}");
        }
    }

    #[test]
    fn generator_matches_direct_evaluation() {
        let len = 64;
        let center = 31.6;
        for kind in WindowKind::FIXED
            .into_iter()
            .chain([WindowKind::lanczos(4.0), WindowKind::lanczos(40.0)])
        {
            for cutoff in [0.5, 0.2, 0.03] {
                let mut generator = WindowGenerator::new(kind, len, center, cutoff);
                for i in 0..len {
                    let x = i as f64 - center;
                    let recursive = generator.next(i, x);
                    let direct = kind.evaluate(i, len, x, cutoff);
                    assert!(
                        (recursive - direct).abs() < 1e-12,
                        "{} at {cutoff} tap {i}: {recursive} vs {direct}",
                        kind.name()
                    );
                }
            }
        }
    }

    #[test]
    fn cosine_sum_rows_peak_at_unity() {
        // At θ = π (c = −1) every cosine-sum window is at its peak.
        let peak = |kind: WindowKind| horner(kind.cosine_sum_row().unwrap(), -1.0);
        assert!((peak(WindowKind::Hann) - 1.0).abs() < 1e-12);
        assert!((peak(WindowKind::BlackmanHarris) - 1.0).abs() < 1e-12);
        assert!((peak(WindowKind::Nuttall) - 1.0).abs() < 1e-12);
        assert!((peak(WindowKind::Flattop) - 1.0).abs() < 1e-6);
    }
}
