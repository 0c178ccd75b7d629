//! Polynomial residual tables for PolyBLEP and PolyBLAMP correction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::horner;

/*
Polynomial Residuals
====================

A naive sawtooth jumps from +1 to −1 in zero time. Sampled, that jump is a
step with infinite bandwidth and everything above Nyquist folds back down as
aliasing. The fix is to replace the ideal step with a smooth one: the
integral of a piecewise-polynomial approximation of a lowpass (here, the
B-spline of the same order as the table).

The difference between smooth and ideal step is the residual R(τ). It is
nonzero only for |τ| < N/2 samples around the discontinuity, so it can be
added to the naive waveform after the fact:

                 ideal step           smooth step          residual
                      ┌────                ╭────               ╭╮
                      │                   ╱                ───╯ ╰─┐╭──
                  ────┘              ────╯                          ╰╯

Each table row is the residual over one sample interval as a polynomial in
d ∈ [0, 1), ascending powers. Row p covers tap offset p − N/2 relative to
the first sample taken after the discontinuity, where d is how far (in
samples) that sample lies past the edge.

  PolyBLEP   residual of a unit step (value discontinuity).  Degree N.
  PolyBLAMP  residual of a unit ramp (slope discontinuity).   Degree N + 1.
             The integral of the BLEP residual; used for triangles.

Orders 4, 6 and 8 trade correction length (and latency) for alias rejection.
*/

/// Number of samples a residual correction spans.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResidualOrder {
    Four,
    Six,
    #[default]
    Eight,
}

impl ResidualOrder {
    pub fn points(self) -> usize {
        match self {
            ResidualOrder::Four => 4,
            ResidualOrder::Six => 6,
            ResidualOrder::Eight => 8,
        }
    }
}

/// Piecewise-polynomial residual, one row of coefficients per tap.
#[derive(Debug)]
pub struct ResidualTable {
    points: usize,
    stride: usize,
    coefficients: &'static [f64],
}

impl ResidualTable {
    /// Taps touched by one correction.
    #[inline]
    pub fn points(&self) -> usize {
        self.points
    }

    /// Polynomial degree of every row.
    pub fn degree(&self) -> usize {
        self.stride - 1
    }

    pub fn row(&self, tap: usize) -> &'static [f64] {
        let start = tap * self.stride;
        &self.coefficients[start..start + self.stride]
    }

    /// Residual for tap row `tap` when the sample lies `d` samples past the edge.
    #[inline]
    pub fn evaluate(&self, tap: usize, d: f64) -> f64 {
        horner(self.row(tap), d)
    }

    pub fn blep(order: ResidualOrder) -> &'static ResidualTable {
        match order {
            ResidualOrder::Four => &BLEP4,
            ResidualOrder::Six => &BLEP6,
            ResidualOrder::Eight => &BLEP8,
        }
    }

    pub fn blamp(order: ResidualOrder) -> &'static ResidualTable {
        match order {
            ResidualOrder::Four => &BLAMP4,
            ResidualOrder::Six => &BLAMP6,
            ResidualOrder::Eight => &BLAMP8,
        }
    }
}

pub static BLEP4: ResidualTable = ResidualTable {
    points: 4,
    stride: 5,
    coefficients: &BLEP4_COEFFICIENTS,
};

pub static BLEP6: ResidualTable = ResidualTable {
    points: 6,
    stride: 7,
    coefficients: &BLEP6_COEFFICIENTS,
};

pub static BLEP8: ResidualTable = ResidualTable {
    points: 8,
    stride: 9,
    coefficients: &BLEP8_COEFFICIENTS,
};

pub static BLAMP4: ResidualTable = ResidualTable {
    points: 4,
    stride: 6,
    coefficients: &BLAMP4_COEFFICIENTS,
};

pub static BLAMP6: ResidualTable = ResidualTable {
    points: 6,
    stride: 8,
    coefficients: &BLAMP6_COEFFICIENTS,
};

pub static BLAMP8: ResidualTable = ResidualTable {
    points: 8,
    stride: 10,
    coefficients: &BLAMP8_COEFFICIENTS,
};

#[rustfmt::skip]
static BLEP4_COEFFICIENTS: [f64; 4 * 5] = [
    // tap -2
    0.0, 0.0, 0.0, 0.0, 1.0 / 24.0,
    // tap -1
    1.0 / 24.0, 1.0 / 6.0, 1.0 / 4.0, 1.0 / 6.0, -1.0 / 8.0,
    // tap +0
    -1.0 / 2.0, 2.0 / 3.0, 0.0, -1.0 / 3.0, 1.0 / 8.0,
    // tap +1
    -1.0 / 24.0, 1.0 / 6.0, -1.0 / 4.0, 1.0 / 6.0, -1.0 / 24.0,
];

#[rustfmt::skip]
static BLEP6_COEFFICIENTS: [f64; 6 * 7] = [
    // tap -3
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0 / 720.0,
    // tap -2
    1.0 / 720.0, 1.0 / 120.0, 1.0 / 48.0, 1.0 / 36.0, 1.0 / 48.0, 1.0 / 120.0, -1.0 / 144.0,
    // tap -1
    29.0 / 360.0, 13.0 / 60.0, 5.0 / 24.0, 1.0 / 18.0, -1.0 / 24.0, -1.0 / 30.0, 1.0 / 72.0,
    // tap +0
    -1.0 / 2.0, 11.0 / 20.0, 0.0, -1.0 / 6.0, 0.0, 1.0 / 20.0, -1.0 / 72.0,
    // tap +1
    -29.0 / 360.0, 13.0 / 60.0, -5.0 / 24.0, 1.0 / 18.0, 1.0 / 24.0, -1.0 / 30.0, 1.0 / 144.0,
    // tap +2
    -1.0 / 720.0, 1.0 / 120.0, -1.0 / 48.0, 1.0 / 36.0, -1.0 / 48.0, 1.0 / 120.0, -1.0 / 720.0,
];

#[rustfmt::skip]
static BLEP8_COEFFICIENTS: [f64; 8 * 9] = [
    // tap -4
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0 / 40320.0,
    // tap -3
    1.0 / 40320.0, 1.0 / 5040.0, 1.0 / 1440.0, 1.0 / 720.0, 1.0 / 576.0, 1.0 / 720.0, 1.0 / 1440.0, 1.0 / 5040.0, -1.0 / 5760.0,
    // tap -2
    31.0 / 5040.0, 1.0 / 42.0, 7.0 / 180.0, 1.0 / 30.0, 1.0 / 72.0, 0.0, -1.0 / 360.0, -1.0 / 840.0, 1.0 / 1920.0,
    // tap -1
    4541.0 / 40320.0, 397.0 / 1680.0, 49.0 / 288.0, 1.0 / 48.0, -19.0 / 576.0, -1.0 / 80.0, 1.0 / 288.0, 1.0 / 336.0, -1.0 / 1152.0,
    // tap +0
    -1.0 / 2.0, 151.0 / 315.0, 0.0, -1.0 / 9.0, 0.0, 1.0 / 45.0, 0.0, -1.0 / 252.0, 1.0 / 1152.0,
    // tap +1
    -4541.0 / 40320.0, 397.0 / 1680.0, -49.0 / 288.0, 1.0 / 48.0, 19.0 / 576.0, -1.0 / 80.0, -1.0 / 288.0, 1.0 / 336.0, -1.0 / 1920.0,
    // tap +2
    -31.0 / 5040.0, 1.0 / 42.0, -7.0 / 180.0, 1.0 / 30.0, -1.0 / 72.0, 0.0, 1.0 / 360.0, -1.0 / 840.0, 1.0 / 5760.0,
    // tap +3
    -1.0 / 40320.0, 1.0 / 5040.0, -1.0 / 1440.0, 1.0 / 720.0, -1.0 / 576.0, 1.0 / 720.0, -1.0 / 1440.0, 1.0 / 5040.0, -1.0 / 40320.0,
];

#[rustfmt::skip]
static BLAMP4_COEFFICIENTS: [f64; 4 * 6] = [
    // tap -2
    0.0, 0.0, 0.0, 0.0, 0.0, 1.0 / 120.0,
    // tap -1
    1.0 / 120.0, 1.0 / 24.0, 1.0 / 12.0, 1.0 / 12.0, 1.0 / 24.0, -1.0 / 40.0,
    // tap +0
    7.0 / 30.0, -1.0 / 2.0, 1.0 / 3.0, 0.0, -1.0 / 12.0, 1.0 / 40.0,
    // tap +1
    1.0 / 120.0, -1.0 / 24.0, 1.0 / 12.0, -1.0 / 12.0, 1.0 / 24.0, -1.0 / 120.0,
];

#[rustfmt::skip]
static BLAMP6_COEFFICIENTS: [f64; 6 * 8] = [
    // tap -3
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0 / 5040.0,
    // tap -2
    1.0 / 5040.0, 1.0 / 720.0, 1.0 / 240.0, 1.0 / 144.0, 1.0 / 144.0, 1.0 / 240.0, 1.0 / 720.0, -1.0 / 1008.0,
    // tap -1
    61.0 / 2520.0, 29.0 / 360.0, 13.0 / 120.0, 5.0 / 72.0, 1.0 / 72.0, -1.0 / 120.0, -1.0 / 180.0, 1.0 / 504.0,
    // tap +0
    239.0 / 840.0, -1.0 / 2.0, 11.0 / 40.0, 0.0, -1.0 / 24.0, 0.0, 1.0 / 120.0, -1.0 / 504.0,
    // tap +1
    61.0 / 2520.0, -29.0 / 360.0, 13.0 / 120.0, -5.0 / 72.0, 1.0 / 72.0, 1.0 / 120.0, -1.0 / 180.0, 1.0 / 1008.0,
    // tap +2
    1.0 / 5040.0, -1.0 / 720.0, 1.0 / 240.0, -1.0 / 144.0, 1.0 / 144.0, -1.0 / 240.0, 1.0 / 720.0, -1.0 / 5040.0,
];

#[rustfmt::skip]
static BLAMP8_COEFFICIENTS: [f64; 8 * 10] = [
    // tap -4
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0 / 362880.0,
    // tap -3
    1.0 / 362880.0, 1.0 / 40320.0, 1.0 / 10080.0, 1.0 / 4320.0, 1.0 / 2880.0, 1.0 / 2880.0, 1.0 / 4320.0, 1.0 / 10080.0, 1.0 / 40320.0, -1.0 / 51840.0,
    // tap -2
    1.0 / 720.0, 31.0 / 5040.0, 1.0 / 84.0, 7.0 / 540.0, 1.0 / 120.0, 1.0 / 360.0, 0.0, -1.0 / 2520.0, -1.0 / 6720.0, 1.0 / 17280.0,
    // tap -1
    347.0 / 8064.0, 4541.0 / 40320.0, 397.0 / 3360.0, 49.0 / 864.0, 1.0 / 192.0, -19.0 / 2880.0, -1.0 / 480.0, 1.0 / 2016.0, 1.0 / 2688.0, -1.0 / 10368.0,
    // tap +0
    1487.0 / 4536.0, -1.0 / 2.0, 151.0 / 630.0, 0.0, -1.0 / 36.0, 0.0, 1.0 / 270.0, 0.0, -1.0 / 2016.0, 1.0 / 10368.0,
    // tap +1
    347.0 / 8064.0, -4541.0 / 40320.0, 397.0 / 3360.0, -49.0 / 864.0, 1.0 / 192.0, 19.0 / 2880.0, -1.0 / 480.0, -1.0 / 2016.0, 1.0 / 2688.0, -1.0 / 17280.0,
    // tap +2
    1.0 / 720.0, -31.0 / 5040.0, 1.0 / 84.0, -7.0 / 540.0, 1.0 / 120.0, -1.0 / 360.0, 0.0, 1.0 / 2520.0, -1.0 / 6720.0, 1.0 / 51840.0,
    // tap +3
    1.0 / 362880.0, -1.0 / 40320.0, 1.0 / 10080.0, -1.0 / 4320.0, 1.0 / 2880.0, -1.0 / 2880.0, 1.0 / 4320.0, -1.0 / 10080.0, 1.0 / 40320.0, -1.0 / 362880.0,
];
