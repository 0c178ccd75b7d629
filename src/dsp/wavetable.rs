use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::Arc;

use crate::dsp::{
    lfo::midi_note_to_hz,
    oscillator::{Oscillator, OscillatorWaveform},
};

/*
Mipmapped Wavetables
====================

One period of a waveform stored as S samples can hold harmonics up to S/2.
Played back at f cycles/sample, harmonic k lands at k·f, and anything past
0.5 aliases. So each octave of playback pitch gets its own table with half
the harmonics of the one below:

  table o holds harmonics 1 ..= (S/2) >> o
  safe while f·S ≤ 2^o

  S = 2048
    o = 0   1024 harmonics   f ≤ 1/2048
    o = 1    512             f ≤ 1/1024
    ...
    o = 10     1             f ≤ 1/2      (pure sine)

Tables are synthesized additively: fill a spectrum with the waveform's
Fourier series up to the limit and run one inverse FFT.

  saw        −(2/π) Σ sin(2πkφ)/k          all k
  square      (4/π) Σ sin(2πkφ)/k          odd k
  triangle  −(8/π²) Σ cos(2πkφ)/k²         odd k

Playback picks the two tables bracketing the current pitch and crossfades
linearly in log-frequency, both of them alias-free:

  p = log2(f·S),  o = ⌈p⌉,  out = (o − p)·T[o] + (1 − o + p)·T[o+1]

Within a table, samples are read with 4-point (cubic) Lagrange
interpolation. Each table carries one guard sample before and two after the
period so the four points never need wrapping.
*/

pub const DEFAULT_TABLE_SIZE: usize = 2048;

const GUARD_BEFORE: usize = 1;
const GUARD_AFTER: usize = 2;

/// 4-point Lagrange interpolation through `y` at positions −1, 0, 1, 2,
/// evaluated at `t` ∈ [0, 1).
#[inline]
pub fn lagrange3(y: [f64; 4], t: f64) -> f64 {
    // Newton forward differences from y[0], evaluated at u = t + 1.
    let u = t + 1.0;
    let d1 = y[1] - y[0];
    let d2 = y[2] - 2.0 * y[1] + y[0];
    let d3 = y[3] - 3.0 * y[2] + 3.0 * y[1] - y[0];
    y[0] + u * (d1 + (u - 1.0) * 0.5 * (d2 + (u - 2.0) * (1.0 / 3.0) * d3))
}

/// A pyramid of band-limited single-cycle tables for one waveform.
#[derive(Debug)]
pub struct Mipmap {
    waveform: OscillatorWaveform,
    size: usize,
    tables: Vec<Vec<f64>>,
}

impl Mipmap {
    /// Build every octave for `waveform` with `size` samples per period
    /// (rounded up to a power of two, at least 8).
    pub fn new(waveform: OscillatorWaveform, size: usize) -> Self {
        let size = size.max(8).next_power_of_two();
        let octaves = size.trailing_zeros() as usize;

        let mut planner = FftPlanner::<f64>::new();
        let ifft = planner.plan_fft_inverse(size);
        let mut spectrum = vec![Complex::new(0.0, 0.0); size];

        let tables = (0..octaves)
            .map(|octave| {
                let limit = ((size / 2) >> octave).min(size / 2 - 1).max(1);
                fill_spectrum(&mut spectrum, waveform, limit);
                ifft.process(&mut spectrum);

                let mut table = Vec::with_capacity(size + GUARD_BEFORE + GUARD_AFTER);
                table.push(spectrum[size - 1].re);
                table.extend(spectrum.iter().map(|c| c.re));
                table.push(spectrum[0].re);
                table.push(spectrum[1].re);
                table
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            waveform = waveform.name(),
            size,
            octaves = tables.len(),
            "built wavetable mipmap"
        );

        Self {
            waveform,
            size,
            tables,
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Samples per period.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn octaves(&self) -> usize {
        self.tables.len()
    }

    /// Highest harmonic stored in `octave`.
    pub fn harmonic_limit(&self, octave: usize) -> usize {
        ((self.size / 2) >> octave).min(self.size / 2 - 1).max(1)
    }

    /// One period of `octave`, without guard samples.
    pub fn table(&self, octave: usize) -> &[f64] {
        let table = &self.tables[octave.min(self.tables.len() - 1)];
        &table[GUARD_BEFORE..GUARD_BEFORE + self.size]
    }

    /// Table index and its crossfade weight for `freq`; the remaining weight
    /// goes to the next table up.
    pub fn select(&self, freq: f64) -> (usize, f64) {
        let last = self.tables.len() - 1;
        let position = (freq * self.size as f64).log2();
        if !(position > -1.0) {
            return (0, 1.0);
        }
        let upper = position.ceil();
        let octave = upper as usize;
        if octave >= last {
            return (last, 1.0);
        }
        (octave, upper - position)
    }

    /// Interpolated value of `octave` at `phase` ∈ [0, 1).
    #[inline]
    pub fn lookup(&self, octave: usize, phase: f64) -> f64 {
        let table = &self.tables[octave];
        let position = phase * self.size as f64;
        let index = (position as usize).min(self.size - 1);
        let t = position - index as f64;
        // table[index] is the sample before `index` because of the leading guard.
        lagrange3(
            [
                table[index],
                table[index + 1],
                table[index + 2],
                table[index + 3],
            ],
            t,
        )
    }
}

fn fill_spectrum(spectrum: &mut [Complex<f64>], waveform: OscillatorWaveform, limit: usize) {
    use std::f64::consts::PI;

    let size = spectrum.len();
    spectrum.fill(Complex::new(0.0, 0.0));

    for k in 1..=limit {
        let n = k as f64;
        let odd = k % 2 == 1;
        // Amplitudes of sin (b) and cos (a) terms.
        let (a, b) = match waveform {
            OscillatorWaveform::Sine => (0.0, if k == 1 { 1.0 } else { 0.0 }),
            OscillatorWaveform::Saw => (0.0, -2.0 / (PI * n)),
            OscillatorWaveform::Square if odd => (0.0, 4.0 / (PI * n)),
            OscillatorWaveform::Triangle if odd => (-8.0 / (PI * PI * n * n), 0.0),
            _ => (0.0, 0.0),
        };
        // The inverse FFT is unnormalized: x[j] = Σ X[k]·e^(2πijk/S).
        spectrum[k] = Complex::new(0.5 * a, -0.5 * b);
        spectrum[size - k] = Complex::new(0.5 * a, 0.5 * b);
    }
}

/// Oscillator reading a shared [`Mipmap`].
#[derive(Debug, Clone)]
pub struct WavetableOscillator {
    mipmap: Arc<Mipmap>,
    phase: f64,
    tick: f64,
    octave: usize,
    weight: f64,
}

impl WavetableOscillator {
    pub fn new(mipmap: Arc<Mipmap>) -> Self {
        Self {
            mipmap,
            phase: 0.0,
            tick: 0.0,
            octave: 0,
            weight: 1.0,
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.mipmap.waveform()
    }

    pub fn mipmap(&self) -> &Arc<Mipmap> {
        &self.mipmap
    }

    /// Play a MIDI note; fractional notes give pitch bend.
    pub fn set_note(&mut self, note: f64, sample_rate: f64) {
        self.set_frequency(midi_note_to_hz(note) / sample_rate);
    }

    /// Octave table currently used and its crossfade weight.
    pub fn octave(&self) -> (usize, f64) {
        (self.octave, self.weight)
    }
}

impl Oscillator for WavetableOscillator {
    fn reset(&mut self, freq: f64, phase: f64) {
        self.phase = if phase.is_finite() {
            phase.rem_euclid(1.0)
        } else {
            0.0
        };
        self.set_frequency(freq);
    }

    fn set_frequency(&mut self, freq: f64) {
        self.tick = if freq.is_finite() {
            freq.clamp(0.0, 0.5)
        } else {
            0.0
        };
        let (octave, weight) = self.mipmap.select(self.tick);
        self.octave = octave;
        self.weight = weight;
    }

    #[inline]
    fn step(&mut self) -> f32 {
        let mut value = self.mipmap.lookup(self.octave, self.phase);
        if self.weight < 1.0 {
            let upper = self.mipmap.lookup(self.octave + 1, self.phase);
            value = self.weight * value + (1.0 - self.weight) * upper;
        }

        self.phase += self.tick;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value as f32
    }
}
