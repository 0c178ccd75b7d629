//! Fractional delay line read through an adaptive windowed-sinc kernel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::collections::VecDeque;

use crate::dsp::{
    sinc::{build_fir_with, clamp_cutoff, cutoff_for_read_rate, Evaluation, MAX_CUTOFF},
    wavetable::lagrange3,
    window::WindowKind,
};

/*
Resampling Delay Line
=====================

A delay line stores the input in a ring buffer and reads it back some time
later. With an integer delay the read is a single lookup. With a fractional
and time-varying delay it becomes resampling: the read head slides through
the stored signal at its own speed.

  write →  [ ... x[n-3] x[n-2] x[n-1] x[n] ]
                        ↑
                read head at n − t   (t = delay in samples, fractional)

Each output sample is a windowed-sinc interpolation around the read head
(see `sinc.rs`). Per sample:

  1. write      advance the write index (bit mask wrap), store the input
  2. taps       L = clamp(2·⌊t⌋, 2, L_max)
                A kernel of L taps reaches L/2 samples past the read head.
                Short delays get short kernels so they never read ahead of
                the write index.
  3. clamp      t into [L/2 − 1, max_delay]
  4. cutoff     read rate r = t_prev − t + 1
                (1 = standing still relative to the input, 2 = reading twice
                as fast, ...). |r| ≤ 1 keeps the full band, otherwise the
                cutoff drops to 2^(−|r|).
  5. kernel     fraction = t − ⌊t⌋, snapped to 0 or 1 when within ~2e-13
  6. sum        L taps starting ⌊t⌋ + L/2 samples back

The write happens before the read, so t = 0 is plain feedthrough.


Cutoff tracking
---------------

ReadRate     uses the read rate of the current sample. Reacts instantly.

HeldPitch    remembers the read rate that was in effect when each input
             sample was written and reports the one belonging to the sample
             now passing under the read head. A sample written while the head
             was racing keeps its low cutoff until it is actually read, which
             suits pitch-shifters that sweep and then hold.


Slew limiting
-------------

With a slew rate s, the delay moves at most s samples per sample towards its
target. This bounds the read rate to 1 ± s and with it the lowest cutoff the
kernel will ever be asked for.


Capacity
--------

`reset` is the only call that allocates. The ring it sizes can hold delays up
to N − L_max/2 − 1 (`delay_capacity`), usually more than was asked for since N
is rounded up to a power of two. Moving the bound anywhere inside that range
is free and keeps the stored history.


Cheap readers
-------------

Besides the sinc kernel the same ring can be read with a polynomial:

  Integer   x[n − ⌊t⌋]
  Linear    lerp between ⌊t⌋ and ⌊t⌋ + 1
  Cubic     4-point Lagrange through ⌊t⌋ − 1 ... ⌊t⌋ + 2 (linear below t = 1)

They skip the kernel and the anti-aliasing cutoff entirely.
*/

/// Default upper bound on kernel length.
pub const DEFAULT_MAX_TAP: usize = 256;

/// Fractions closer than this to 0 or 1 are snapped.
pub const FRACTION_MARGIN: f64 = 1024.0 * f64::EPSILON;

/// How the resampler picks its anti-aliasing cutoff.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutoffTracking {
    /// From the read rate of the current sample.
    #[default]
    ReadRate,
    /// From the read rate in effect when the sample under the read head was written.
    HeldPitch,
}

/// How the read head interpolates between stored samples.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Adaptive windowed-sinc kernel.
    #[default]
    Sinc,
    /// Nearest older sample, no interpolation.
    Integer,
    Linear,
    /// 4-point Lagrange.
    Cubic,
}

impl Interpolation {
    /// Samples read per output sample, the sinc kernel aside.
    fn points(&self) -> usize {
        match self {
            Interpolation::Sinc => 0,
            Interpolation::Integer => 1,
            Interpolation::Linear => 2,
            Interpolation::Cubic => 4,
        }
    }
}

/// Tracks which past read rate the read head is currently consuming.
#[derive(Debug, Clone)]
struct PitchTracker {
    pending: VecDeque<f64>,
    capacity: usize,
    holding: f64,
}

impl PitchTracker {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
            holding: 1.0,
        }
    }

    fn clear(&mut self) {
        self.pending.clear();
        self.holding = 1.0;
    }

    /// Record this sample's read rate and consume one output sample's worth of input.
    fn push(&mut self, pitch: f64) -> f64 {
        if self.pending.len() >= self.capacity {
            self.pending.pop_front();
        }
        self.pending.push_back(pitch);

        let mut carry = 1.0;
        while let Some(front) = self.pending.front_mut() {
            *front -= carry;
            carry = -*front;
            if carry <= 0.0 {
                if self.pending.len() == 1 {
                    self.holding = pitch;
                }
                break;
            }

            self.pending.pop_front();
            match self.pending.front() {
                Some(&next) => self.holding = next,
                None => {
                    self.holding = 1.0;
                    break;
                }
            }
        }
        self.holding
    }
}

/// Delay line with a bandlimited fractional read.
///
/// ```
/// use sinc_dsp::dsp::delay::Resampler;
///
/// let mut delay = Resampler::new(64, 32);
/// let out: Vec<f32> = (0..16)
///     .map(|n| delay.process(if n == 0 { 1.0 } else { 0.0 }, 4.0))
///     .collect();
/// assert!((out[4] - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Resampler {
    buffer: Vec<f32>,
    mask: usize,
    write_pos: usize,
    max_delay: usize,
    max_tap: usize,
    fir: Vec<f64>,
    prev_time: f64,
    window: WindowKind,
    evaluation: Evaluation,
    interpolation: Interpolation,
    tracking: CutoffTracking,
    pitch: PitchTracker,
    slew_rate: Option<f64>,
    cutoff_cap: f64,
    last_cutoff: f64,
    last_tap_count: usize,
}

impl Resampler {
    /// Allocate for delays up to `max_delay` samples and kernels up to `max_tap` taps.
    pub fn new(max_delay: usize, max_tap: usize) -> Self {
        let mut resampler = Self {
            buffer: Vec::new(),
            mask: 0,
            write_pos: 0,
            max_delay: 0,
            max_tap: 2,
            fir: Vec::new(),
            prev_time: 0.0,
            window: WindowKind::default(),
            evaluation: Evaluation::default(),
            interpolation: Interpolation::default(),
            tracking: CutoffTracking::default(),
            pitch: PitchTracker::with_capacity(0),
            slew_rate: None,
            cutoff_cap: MAX_CUTOFF,
            last_cutoff: MAX_CUTOFF,
            last_tap_count: 0,
        };
        resampler.reset(max_delay, max_tap);
        resampler
    }

    pub fn with_window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    pub fn with_evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_tracking(mut self, tracking: CutoffTracking) -> Self {
        self.tracking = tracking;
        self
    }

    /// Limit how far the delay may move per sample. `None` disables limiting.
    pub fn with_slew_rate(mut self, slew_rate: Option<f64>) -> Self {
        self.set_slew_rate(slew_rate);
        self
    }

    /// Resize and zero everything. The only call that allocates.
    ///
    /// `max_tap` is rounded down to an even count of at least 2.
    pub fn reset(&mut self, max_delay: usize, max_tap: usize) {
        let max_tap = (max_tap.max(2) / 2) * 2;
        let size = (max_delay + max_tap / 2 + 1).next_power_of_two();

        self.buffer.clear();
        self.buffer.resize(size, 0.0);
        self.mask = size - 1;
        self.fir.clear();
        self.fir.resize(max_tap, 0.0);
        self.max_delay = max_delay;
        self.max_tap = max_tap;
        // Enough pending pitches for any bound up to `delay_capacity`.
        self.pitch = PitchTracker::with_capacity(size + max_tap / 2 + 1);
        self.clear();

        tracing::debug!(max_delay, max_tap, buffer_len = size, "resampler reset");
    }

    /// Zero the buffer and tracking state without reallocating.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.prev_time = 0.0;
        self.pitch.clear();
        self.last_cutoff = MAX_CUTOFF;
        self.last_tap_count = 0;
    }

    /// Change the delay bound.
    ///
    /// Within [`delay_capacity`](Self::delay_capacity) this is in place and
    /// keeps the history. Beyond it the line is reallocated and cleared, so
    /// growing must not happen on the audio thread.
    pub fn set_max_delay(&mut self, max_delay: usize) {
        if max_delay <= self.delay_capacity() {
            self.max_delay = max_delay;
            self.prev_time = self.prev_time.min(max_delay as f64);
            tracing::trace!(max_delay, "resampler delay bound changed in place");
        } else {
            self.reset(max_delay, self.max_tap);
        }
    }

    /// Upper bound on the kernel cutoff in cycles/sample, clamped to `(ε, 0.5]`.
    pub fn set_cutoff(&mut self, cutoff: f64) {
        self.cutoff_cap = clamp_cutoff(cutoff);
    }

    pub fn set_window(&mut self, window: WindowKind) {
        self.window = window;
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn set_tracking(&mut self, tracking: CutoffTracking) {
        self.tracking = tracking;
        self.pitch.clear();
    }

    pub fn set_slew_rate(&mut self, slew_rate: Option<f64>) {
        self.slew_rate = slew_rate.filter(|rate| !rate.is_nan()).map(f64::abs);
    }

    pub fn max_delay(&self) -> usize {
        self.max_delay
    }

    pub fn max_tap(&self) -> usize {
        self.max_tap
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Largest delay bound the current allocation holds.
    pub fn delay_capacity(&self) -> usize {
        self.buffer.len() - self.max_tap / 2 - 1
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn window(&self) -> WindowKind {
        self.window
    }

    /// Delay actually used for the last sample, after slew limiting and clamping.
    pub fn current_delay(&self) -> f64 {
        self.prev_time
    }

    /// Cutoff used for the last sample.
    pub fn last_cutoff(&self) -> f64 {
        self.last_cutoff
    }

    /// Kernel length used for the last sample (0 before the first read).
    pub fn last_tap_count(&self) -> usize {
        self.last_tap_count
    }

    /// Write `input`, then read `delay` samples back.
    #[inline]
    pub fn process(&mut self, input: f32, delay: f64) -> f32 {
        self.write_pos = (self.write_pos + 1) & self.mask;
        self.buffer[self.write_pos] = input;

        let mut time = if delay.is_nan() { 0.0 } else { delay };
        if let Some(slew) = self.slew_rate {
            time = time.clamp(self.prev_time - slew, self.prev_time + slew);
        }

        match self.interpolation {
            Interpolation::Sinc => self.read_sinc(input, time),
            interpolation => self.read_polynomial(time, interpolation),
        }
    }

    fn read_sinc(&mut self, input: f32, time: f64) -> f32 {
        let max_delay = self.max_delay as f64;
        let whole_samples = time.max(0.0).min(max_delay) as usize;
        let tap_count = (2 * whole_samples).clamp(2, self.max_tap);
        let half = tap_count / 2;
        let clamped = time.clamp((half - 1) as f64, max_delay);

        let read_rate = self.prev_time - clamped + 1.0;
        self.prev_time = clamped;
        let rate = match self.tracking {
            CutoffTracking::ReadRate => read_rate.abs(),
            CutoffTracking::HeldPitch => self.pitch.push(read_rate),
        };
        let cutoff = cutoff_for_read_rate(rate).min(self.cutoff_cap);
        self.last_cutoff = cutoff;

        if time <= 0.0 {
            self.last_tap_count = 0;
            return input;
        }

        let whole = clamped.floor();
        let time_int = whole as usize;
        let mut fraction = clamped - whole;
        if fraction < FRACTION_MARGIN {
            fraction = 0.0;
        } else if fraction > 1.0 - FRACTION_MARGIN {
            fraction = 1.0;
        }

        let fir = build_fir_with(
            &mut self.fir[..tap_count],
            cutoff,
            fraction,
            self.window,
            self.evaluation,
        );
        self.last_tap_count = tap_count;

        let mut read = self.write_pos.wrapping_sub(time_int + half) & self.mask;
        let mut acc = 0.0;
        for &h in fir {
            acc += h * f64::from(self.buffer[read]);
            read = (read + 1) & self.mask;
        }
        acc as f32
    }

    fn read_polynomial(&mut self, time: f64, interpolation: Interpolation) -> f32 {
        let clamped = time.clamp(0.0, self.max_delay as f64);
        self.prev_time = clamped;
        self.last_cutoff = MAX_CUTOFF;
        self.last_tap_count = interpolation.points();

        let whole = clamped.floor();
        let time_int = whole as usize;
        let fraction = clamped - whole;
        let (buffer, mask, write_pos) = (&self.buffer, self.mask, self.write_pos);
        let at = |delay: usize| f64::from(buffer[write_pos.wrapping_sub(delay) & mask]);
        let linear = || {
            let y0 = at(time_int);
            y0 + fraction * (at(time_int + 1) - y0)
        };

        let out = match interpolation {
            Interpolation::Integer => at(time_int),
            Interpolation::Cubic if time_int >= 1 => lagrange3(
                [
                    at(time_int - 1),
                    at(time_int),
                    at(time_int + 1),
                    at(time_int + 2),
                ],
                fraction,
            ),
            _ => linear(),
        };
        out as f32
    }

    /// Process a block in place at a fixed delay.
    pub fn render(&mut self, buffer: &mut [f32], delay: f64) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, delay);
        }
    }

    /// Process a block in place with one delay value per sample.
    pub fn render_modulated(&mut self, buffer: &mut [f32], delays: &[f64]) {
        for (sample, &delay) in buffer.iter_mut().zip(delays) {
            *sample = self.process(*sample, delay);
        }
    }
}
