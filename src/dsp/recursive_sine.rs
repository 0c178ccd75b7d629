//! Recursive sinusoid generators.

use std::f64::consts::TAU;

/*
Recursive Sine Generators
=========================

Calling `sin()` once per sample is expensive. A sinusoid can instead be
produced by a short linear recurrence: each new sample is a fixed linear
combination of the previous state. Three recurrences live here.

  Biquad        u[n] = k·u[n-1] − u[n-2],  k = 2·cos ω
                One multiply, one subtract. Exact for a constant ω, but the
                state (two adjacent samples) only describes a sinusoid of the
                ω it was started with. Change ω mid-stream and the amplitude
                jumps. Re-seed after a frequency change.

  Reinsch       u += v;  v −= A²·u,  A = 2·sin(ω/2)
                Stores the difference between samples instead of two samples.
                Stays accurate for tiny ω where 2·cos ω rounds to 2.

  Stable        w = u − k1·v;  v += k2·w;  u = w − k1·v
  quadrature    k1 = tan(ω/2), k2 = sin ω
                Three shears that compose to an exact rotation by ω. The
                radius √(u² + v²) is preserved whatever ω does between steps,
                so it is safe under frequency modulation. Yields sine (v) and
                cosine (u) together.


Seeding
-------

Every variant starts one or two samples "before" the requested phase so the
first call to `step()` returns sin(φ):

  biquad:      u1 = sin(φ − ω),  u2 = sin(φ − 2ω)
  reinsch:     u  = sin(φ − ω),  v  = A·cos(φ − ω/2)
  quadrature:  u  = cos(φ − ω),  v  = sin(φ − ω)

The shifted values come from the angle-subtraction identities applied to
sin φ, cos φ, sin ω, cos ω (and sin 2ω, cos 2ω derived from them), never from
stepping forward from phase zero.


Units
-----

Public constructors take normalized frequency (cycles/sample, Nyquist = 0.5)
and phase in cycles. The `*_angular` methods take radians and are used by the
FIR kernel, which walks arbitrary angular increments.
*/

/// Common interface for the recurrences.
pub trait SineGenerator {
    /// Restart at `freq` cycles/sample with the next output at `phase` cycles.
    fn reset(&mut self, freq: f64, phase: f64);

    /// Change the per-sample increment without touching the state.
    fn set_frequency(&mut self, freq: f64);

    /// Emit `sin(φ + nω)` and advance.
    fn step(&mut self) -> f64;

    fn render(&mut self, out: &mut [f64]) {
        for sample in out.iter_mut() {
            *sample = self.step();
        }
    }
}

/// `sin`/`cos` of `phase − omega` and `phase − 2·omega`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftedPhase {
    pub sin_1: f64,
    pub cos_1: f64,
    pub sin_2: f64,
    pub cos_2: f64,
}

impl ShiftedPhase {
    pub fn new(phase: f64, omega: f64) -> Self {
        let (sin_p, cos_p) = phase.sin_cos();
        let (sin_w, cos_w) = omega.sin_cos();
        let sin_2w = 2.0 * sin_w * cos_w;
        let cos_2w = 2.0 * cos_w * cos_w - 1.0;

        Self {
            sin_1: sin_p * cos_w - cos_p * sin_w,
            cos_1: cos_p * cos_w + sin_p * sin_w,
            sin_2: sin_p * cos_2w - cos_p * sin_2w,
            cos_2: cos_p * cos_2w + sin_p * sin_2w,
        }
    }
}

/// Three-term recurrence `u[n] = 2cos(ω)·u[n-1] − u[n-2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadSine {
    omega: f64,
    k: f64,
    u1: f64,
    u2: f64,
}

impl BiquadSine {
    pub fn new(freq: f64, phase: f64) -> Self {
        let mut osc = Self {
            omega: 0.0,
            k: 2.0,
            u1: 0.0,
            u2: 0.0,
        };
        osc.reset(freq, phase);
        osc
    }

    /// Phase in radians of the most recent output, recovered from the state.
    pub fn current_phase(&self) -> f64 {
        let (sin_w, cos_w) = self.omega.sin_cos();
        // u2 = sin(θ − ω) = sin θ cos ω − cos θ sin ω
        let cos_theta = if sin_w.abs() > 1e-12 {
            (self.u1 * cos_w - self.u2) / sin_w
        } else {
            (1.0 - self.u1 * self.u1).max(0.0).sqrt()
        };
        self.u1.atan2(cos_theta)
    }

    /// Change frequency and restart from the current phase.
    ///
    /// Use this instead of [`SineGenerator::set_frequency`] when ω jumps; the
    /// plain setter keeps the old state and the amplitude drifts.
    pub fn reseed(&mut self, freq: f64) {
        let theta = self.current_phase();
        let omega = TAU * freq;
        self.reset(freq, (theta + omega) / TAU);
    }
}

impl SineGenerator for BiquadSine {
    fn reset(&mut self, freq: f64, phase: f64) {
        self.omega = TAU * freq;
        self.k = 2.0 * self.omega.cos();
        let seed = ShiftedPhase::new(TAU * phase, self.omega);
        self.u1 = seed.sin_1;
        self.u2 = seed.sin_2;
    }

    fn set_frequency(&mut self, freq: f64) {
        self.omega = TAU * freq;
        self.k = 2.0 * self.omega.cos();
    }

    #[inline]
    fn step(&mut self) -> f64 {
        let u0 = self.k * self.u1 - self.u2;
        self.u2 = self.u1;
        self.u1 = u0;
        u0
    }
}

/// Reinsch's modified recurrence, accurate for small ω.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReinschSine {
    a: f64,
    k: f64,
    u: f64,
    v: f64,
}

impl ReinschSine {
    pub fn new(freq: f64, phase: f64) -> Self {
        let mut osc = Self {
            a: 0.0,
            k: 0.0,
            u: 0.0,
            v: 0.0,
        };
        osc.reset(freq, phase);
        osc
    }
}

impl SineGenerator for ReinschSine {
    fn reset(&mut self, freq: f64, phase: f64) {
        let omega = TAU * freq;
        let phi = TAU * phase;
        self.a = 2.0 * (0.5 * omega).sin();
        self.k = self.a * self.a;

        let seed = ShiftedPhase::new(phi, omega);
        let (sin_p, cos_p) = phi.sin_cos();
        let (sin_h, cos_h) = (0.5 * omega).sin_cos();
        self.u = seed.sin_1;
        self.v = self.a * (cos_p * cos_h + sin_p * sin_h);
    }

    fn set_frequency(&mut self, freq: f64) {
        self.a = 2.0 * (0.5 * TAU * freq).sin();
        self.k = self.a * self.a;
    }

    #[inline]
    fn step(&mut self) -> f64 {
        self.u += self.v;
        self.v -= self.k * self.u;
        self.u
    }
}

/// Magnitude-preserving quadrature oscillator. `v` is the sine, `u` the cosine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableQuadrature {
    k1: f64,
    k2: f64,
    u: f64,
    v: f64,
}

impl Default for StableQuadrature {
    fn default() -> Self {
        Self::from_angular(0.0, 0.0)
    }
}

impl StableQuadrature {
    pub fn new(freq: f64, phase: f64) -> Self {
        Self::from_angular(TAU * freq, TAU * phase)
    }

    /// Start with `omega` radians/sample and the next output at `phase` radians.
    pub fn from_angular(omega: f64, phase: f64) -> Self {
        let mut osc = Self {
            k1: 0.0,
            k2: 0.0,
            u: 1.0,
            v: 0.0,
        };
        osc.reset_angular(omega, phase);
        osc
    }

    pub fn reset_angular(&mut self, omega: f64, phase: f64) {
        self.set_angular_frequency(omega);
        let seed = ShiftedPhase::new(phase, omega);
        self.u = seed.cos_1;
        self.v = seed.sin_1;
    }

    #[inline]
    pub fn set_angular_frequency(&mut self, omega: f64) {
        self.k1 = (0.5 * omega).tan();
        self.k2 = omega.sin();
    }

    /// Advance one sample and return `(sin, cos)`.
    #[inline]
    pub fn step_quadrature(&mut self) -> (f64, f64) {
        let w = self.u - self.k1 * self.v;
        self.v += self.k2 * w;
        self.u = w - self.k1 * self.v;
        (self.v, self.u)
    }

    /// Radius of the state vector (1.0 when freshly seeded).
    pub fn magnitude(&self) -> f64 {
        self.u.hypot(self.v)
    }
}

impl SineGenerator for StableQuadrature {
    fn reset(&mut self, freq: f64, phase: f64) {
        self.reset_angular(TAU * freq, TAU * phase);
    }

    fn set_frequency(&mut self, freq: f64) {
        self.set_angular_frequency(TAU * freq);
    }

    #[inline]
    fn step(&mut self) -> f64 {
        self.step_quadrature().0
    }
}
