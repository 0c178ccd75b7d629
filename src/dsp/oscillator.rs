#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::sync::Arc;

use crate::dsp::{
    polyblep::ResidualOscillator,
    recursive_sine::StableQuadrature,
    residual::ResidualOrder,
    wavetable::{Mipmap, WavetableOscillator},
};

/*
Oscillators
===========

Three ways to make a periodic waveform, picked per use:

  SineOscillator       stable quadrature recurrence, two multiplies per
                       sample and no trig calls. Exact under FM. LFOs use it.

  ResidualOscillator   naive saw/square/triangle plus a polynomial residual
                       added around every edge (PolyBLEP, PolyBLAMP).
                       Cheap, tunable continuously, N/2 samples of latency.

  WavetableOscillator  precomputed band-limited single-cycle tables, one per
                       octave, read with cubic interpolation. No latency and
                       alias-free by construction, at the cost of memory.

Frequencies are in cycles/sample and phases in cycles. Every oscillator
produces its first sample at the phase given to `reset`.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OscillatorWaveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl OscillatorWaveform {
    pub const ALL: [OscillatorWaveform; 4] = [
        OscillatorWaveform::Sine,
        OscillatorWaveform::Saw,
        OscillatorWaveform::Square,
        OscillatorWaveform::Triangle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OscillatorWaveform::Sine => "sine",
            OscillatorWaveform::Saw => "saw",
            OscillatorWaveform::Square => "square",
            OscillatorWaveform::Triangle => "triangle",
        }
    }

    /// Unfiltered waveform at `phase` cycles, in [-1, 1].
    #[inline]
    pub fn naive(&self, phase: f64) -> f64 {
        match self {
            OscillatorWaveform::Sine => (std::f64::consts::TAU * phase).sin(),
            OscillatorWaveform::Saw => 2.0 * phase - 1.0,
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// A periodic signal source driven in cycles/sample.
pub trait Oscillator {
    /// Restart at `freq` with the next sample at `phase` cycles.
    fn reset(&mut self, freq: f64, phase: f64);

    /// Change frequency without a phase jump.
    fn set_frequency(&mut self, freq: f64);

    fn step(&mut self) -> f32;

    fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.step();
        }
    }
}

/// Pure recursive sine.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    osc: StableQuadrature,
    freq: f64,
}

impl SineOscillator {
    pub fn new(freq: f64, phase: f64) -> Self {
        Self {
            osc: StableQuadrature::new(freq, phase),
            freq,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.freq
    }

    /// Advance one sample and return `(sin, cos)`.
    #[inline]
    pub fn step_quadrature(&mut self) -> (f64, f64) {
        self.osc.step_quadrature()
    }
}

impl Default for SineOscillator {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Oscillator for SineOscillator {
    fn reset(&mut self, freq: f64, phase: f64) {
        self.freq = freq;
        self.osc = StableQuadrature::new(freq, phase);
    }

    fn set_frequency(&mut self, freq: f64) {
        if freq != self.freq {
            self.freq = freq;
            self.osc.set_angular_frequency(std::f64::consts::TAU * freq);
        }
    }

    #[inline]
    fn step(&mut self) -> f32 {
        self.osc.step_quadrature().0 as f32
    }
}

/// Oscillator of any strategy, dispatched by enum so it can live in a node
/// without boxing.
#[derive(Debug, Clone)]
pub enum OscillatorBlock {
    Sine(SineOscillator),
    Residual(ResidualOscillator),
    Wavetable(WavetableOscillator),
}

impl OscillatorBlock {
    pub fn sine() -> Self {
        OscillatorBlock::Sine(SineOscillator::default())
    }

    pub fn sawtooth() -> Self {
        Self::residual(OscillatorWaveform::Saw, ResidualOrder::default())
    }

    pub fn square() -> Self {
        Self::residual(OscillatorWaveform::Square, ResidualOrder::default())
    }

    pub fn triangle() -> Self {
        Self::residual(OscillatorWaveform::Triangle, ResidualOrder::default())
    }

    /// Residual-corrected waveform. A sine has no edges to correct and uses
    /// the recurrence instead.
    pub fn residual(waveform: OscillatorWaveform, order: ResidualOrder) -> Self {
        match waveform {
            OscillatorWaveform::Sine => Self::sine(),
            _ => OscillatorBlock::Residual(ResidualOscillator::new(waveform, order)),
        }
    }

    pub fn wavetable(mipmap: Arc<Mipmap>) -> Self {
        OscillatorBlock::Wavetable(WavetableOscillator::new(mipmap))
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        match self {
            OscillatorBlock::Sine(_) => OscillatorWaveform::Sine,
            OscillatorBlock::Residual(osc) => osc.waveform(),
            OscillatorBlock::Wavetable(osc) => osc.waveform(),
        }
    }

    /// Samples between the phase passed to `reset` and its appearance at the output.
    pub fn latency(&self) -> usize {
        match self {
            OscillatorBlock::Residual(osc) => osc.latency(),
            _ => 0,
        }
    }
}

impl Oscillator for OscillatorBlock {
    fn reset(&mut self, freq: f64, phase: f64) {
        match self {
            OscillatorBlock::Sine(osc) => osc.reset(freq, phase),
            OscillatorBlock::Residual(osc) => osc.reset(freq, phase),
            OscillatorBlock::Wavetable(osc) => osc.reset(freq, phase),
        }
    }

    fn set_frequency(&mut self, freq: f64) {
        match self {
            OscillatorBlock::Sine(osc) => osc.set_frequency(freq),
            OscillatorBlock::Residual(osc) => osc.set_frequency(freq),
            OscillatorBlock::Wavetable(osc) => osc.set_frequency(freq),
        }
    }

    #[inline]
    fn step(&mut self) -> f32 {
        match self {
            OscillatorBlock::Sine(osc) => osc.step(),
            OscillatorBlock::Residual(osc) => osc.step(),
            OscillatorBlock::Wavetable(osc) => osc.step(),
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        match self {
            OscillatorBlock::Sine(osc) => osc.render(out),
            OscillatorBlock::Residual(osc) => osc.render(out),
            OscillatorBlock::Wavetable(osc) => osc.render(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn sine_starts_at_requested_phase() {
        let mut osc = SineOscillator::new(0.01, 0.25);
        assert!((osc.step() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sine_matches_reference() {
        let freq = 440.0 / 48_000.0;
        let mut osc = SineOscillator::new(freq, 0.0);
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer);

        let sample_index = 12;
        let expected = (TAU * freq * sample_index as f64).sin() as f32;
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn sine_frequency_change_keeps_phase() {
        let mut osc = SineOscillator::new(0.01, 0.0);
        for _ in 0..37 {
            osc.step();
        }
        // Last output was at 36 steps; the next one advances by the new increment.
        osc.set_frequency(0.02);
        let (s, c) = osc.step_quadrature();
        let phase = TAU * (0.01 * 36.0 + 0.02);
        assert!((s - phase.sin()).abs() < 1e-9);
        assert!((c - phase.cos()).abs() < 1e-9);
    }

    #[test]
    fn naive_waveforms_are_bipolar() {
        for waveform in OscillatorWaveform::ALL {
            for i in 0..100 {
                let value = waveform.naive(i as f64 / 100.0);
                assert!(
                    (-1.0..=1.0).contains(&value),
                    "{} out of range: {value}",
                    waveform.name()
                );
            }
        }
        assert_eq!(OscillatorWaveform::Triangle.naive(0.5), 1.0);
        assert_eq!(OscillatorWaveform::Saw.naive(0.0), -1.0);
    }

    #[test]
    fn block_dispatch_picks_strategy() {
        assert!(matches!(OscillatorBlock::sine(), OscillatorBlock::Sine(_)));
        assert!(matches!(
            OscillatorBlock::residual(OscillatorWaveform::Sine, ResidualOrder::Four),
            OscillatorBlock::Sine(_)
        ));
        let saw = OscillatorBlock::sawtooth();
        assert_eq!(saw.waveform(), OscillatorWaveform::Saw);
        assert_eq!(saw.latency(), 4);

        let table = Arc::new(Mipmap::new(OscillatorWaveform::Triangle, 256));
        let wavetable = OscillatorBlock::wavetable(table);
        assert_eq!(wavetable.waveform(), OscillatorWaveform::Triangle);
        assert_eq!(wavetable.latency(), 0);
    }

    #[test]
    fn block_reset_is_idempotent() {
        let mut first = OscillatorBlock::square();
        let mut second = OscillatorBlock::square();
        first.reset(0.013, 0.2);
        second.reset(0.013, 0.2);
        second.reset(0.013, 0.2);

        let mut a = vec![0.0f32; 256];
        let mut b = vec![0.0f32; 256];
        first.render(&mut a);
        second.render(&mut b);
        assert_eq!(a, b);
    }
}
