use crate::dsp::{
    oscillator::{Oscillator, OscillatorWaveform},
    residual::{ResidualOrder, ResidualTable},
};

/*
Residual-Corrected Oscillator
=============================

The naive waveform is computed every sample. When the phase crosses an edge
between two samples, the correction for that edge touches N samples: N/2
before the edge (already computed, not yet output) and N/2 after it (not
computed yet). So the oscillator keeps a window of N slots and runs N/2
samples behind:

    slot:   t-4  t-3  t-2  t-1 | t   t+1  t+2  t+3        (N = 8)
            ───────────────────┼──────────────────
            out  ..   ..   ..  | new  pending ...

Every slot holds the naive sample for its time plus the corrections queued
for it. The oldest slot is emitted and recycled as the newest.

Edges and their gains (phase φ in cycles, tick = phase increment):

    saw        wrap      value −2               (BLEP)
    square     φ = 1/2   value −2, wrap +2      (BLEP)
    triangle   φ = 1/2   slope −8·tick          (BLAMP)
               wrap      slope +8·tick

d is how far past the edge the first following sample lies, in samples:
(φ_after − φ_edge) / tick.
*/

const MAX_POINTS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Slot {
    sample: f64,
    pending: f64,
}

/// Whether residuals are still being applied from a recent edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualState {
    Steady,
    Correcting,
}

/// Saw, square or triangle with polynomial residual anti-aliasing.
#[derive(Debug, Clone)]
pub struct ResidualOscillator {
    waveform: OscillatorWaveform,
    table: &'static ResidualTable,
    slots: [Slot; MAX_POINTS],
    pos: usize,
    phase: f64,
    tick: f64,
    correcting: usize,
}

impl ResidualOscillator {
    pub fn new(waveform: OscillatorWaveform, order: ResidualOrder) -> Self {
        let table = match waveform {
            OscillatorWaveform::Triangle => ResidualTable::blamp(order),
            _ => ResidualTable::blep(order),
        };

        Self {
            waveform,
            table,
            slots: [Slot::default(); MAX_POINTS],
            pos: 0,
            phase: 0.0,
            tick: 0.0,
            correcting: 0,
        }
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Output delay in samples.
    pub fn latency(&self) -> usize {
        self.table.points() / 2
    }

    pub fn state(&self) -> ResidualState {
        if self.correcting > 0 {
            ResidualState::Correcting
        } else {
            ResidualState::Steady
        }
    }

    /// Phase (cycles) of the next naive sample.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn add_edge(&mut self, gain: f64, d: f64) {
        let points = self.table.points();
        let half = points / 2;
        // Row p lands on the slot p − N/2 samples after the next one.
        for p in 0..points {
            let slot = (self.pos + 1 + p + points - half) % points;
            self.slots[slot].pending += gain * self.table.evaluate(p, d);
        }
        self.correcting = half;
    }

    fn advance(&mut self) {
        let tick = self.tick;
        let prev = self.phase;
        let mut next = prev + tick;

        let (middle, wrap) = match self.waveform {
            OscillatorWaveform::Sine => (None, None),
            OscillatorWaveform::Saw => (None, Some(-2.0)),
            OscillatorWaveform::Square => (Some(-2.0), Some(2.0)),
            OscillatorWaveform::Triangle => (Some(-8.0 * tick), Some(8.0 * tick)),
        };

        if let Some(gain) = middle {
            if prev < 0.5 && next >= 0.5 {
                self.add_edge(gain, (next - 0.5) / tick);
            }
        }

        if next >= 1.0 {
            next -= 1.0;
            if let Some(gain) = wrap {
                self.add_edge(gain, next / tick);
            }
            if let Some(gain) = middle {
                if next >= 0.5 {
                    self.add_edge(gain, (next - 0.5) / tick);
                }
            }
        }

        self.phase = next;
    }
}

impl Oscillator for ResidualOscillator {
    fn reset(&mut self, freq: f64, phase: f64) {
        self.slots = [Slot::default(); MAX_POINTS];
        self.pos = 0;
        self.correcting = 0;
        self.phase = if phase.is_finite() {
            phase.rem_euclid(1.0)
        } else {
            0.0
        };
        self.set_frequency(freq);
    }

    fn set_frequency(&mut self, freq: f64) {
        // At most one edge of each kind per sample.
        self.tick = if freq.is_finite() {
            freq.clamp(0.0, 0.5)
        } else {
            0.0
        };
    }

    fn step(&mut self) -> f32 {
        let points = self.table.points();
        let half = points / 2;

        self.slots[self.pos].sample = self.waveform.naive(self.phase);

        let oldest = (self.pos + points - half) % points;
        let Slot { sample, pending } = std::mem::take(&mut self.slots[oldest]);

        self.correcting = self.correcting.saturating_sub(1);
        self.advance();
        self.pos = (self.pos + 1) % points;

        (sample + pending) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(
        waveform: OscillatorWaveform,
        order: ResidualOrder,
        freq: f64,
        len: usize,
    ) -> Vec<f32> {
        let mut osc = ResidualOscillator::new(waveform, order);
        osc.reset(freq, 0.0);
        let mut out = vec![0.0; len];
        osc.render(&mut out);
        out
    }

    #[test]
    fn output_is_delayed_by_half_the_order() {
        for order in [ResidualOrder::Four, ResidualOrder::Six, ResidualOrder::Eight] {
            let out = render(OscillatorWaveform::Saw, order, 0.01, 16);
            let half = order.points() / 2;
            assert!(out[..half].iter().all(|&s| s == 0.0), "{out:?}");
            assert!((out[half] + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn saw_matches_naive_away_from_edges() {
        let freq = 0.001;
        let out = render(OscillatorWaveform::Saw, ResidualOrder::Eight, freq, 2000);
        for (n, &sample) in out.iter().enumerate().skip(4) {
            let phase = ((n - 4) as f64 * freq).fract();
            // Residuals reach at most 4 samples from the wrap.
            let distance = phase.min(1.0 - phase) / freq;
            if distance > 5.0 {
                let naive = 2.0 * phase - 1.0;
                assert!((sample as f64 - naive).abs() < 1e-5, "sample {n}");
            }
        }
    }

    #[test]
    fn saw_sample_at_exact_wrap_is_midpoint() {
        // Period 8: the wrap lands exactly on a sample.
        let out = render(OscillatorWaveform::Saw, ResidualOrder::Eight, 0.125, 40);
        for n in (12..40).step_by(8) {
            assert!(out[n].abs() < 1e-6, "sample {n} = {}", out[n]);
        }
        let out = render(OscillatorWaveform::Saw, ResidualOrder::Four, 0.125, 40);
        for n in (10..40).step_by(8) {
            assert!(out[n].abs() < 1e-6, "sample {n} = {}", out[n]);
        }
    }

    #[test]
    fn saw_at_quarter_rate_has_no_nyquist_content() {
        let out = render(OscillatorWaveform::Saw, ResidualOrder::Eight, 0.25, 4096);
        let steady = &out[64..];
        let nyquist: f64 = steady
            .iter()
            .enumerate()
            .map(|(n, &s)| if n % 2 == 0 { s as f64 } else { -(s as f64) })
            .sum();
        let (mut re, mut im) = (0.0, 0.0);
        for (n, &s) in steady.iter().enumerate() {
            let angle = std::f64::consts::TAU * 0.25 * n as f64;
            re += s as f64 * angle.cos();
            im -= s as f64 * angle.sin();
        }
        let fundamental = re.hypot(im);
        let ratio_db = 20.0 * (nyquist.abs() / fundamental + 1e-300).log10();
        assert!(ratio_db < -60.0, "nyquist at {ratio_db} dB");
    }

    #[test]
    fn state_counts_down_after_edge() {
        let mut osc = ResidualOscillator::new(OscillatorWaveform::Saw, ResidualOrder::Eight);
        osc.reset(0.1, 0.85);
        assert_eq!(osc.state(), ResidualState::Steady);

        osc.step();
        osc.step();
        // Phase went 0.85 → 0.95 → 0.05: the wrap was seen.
        assert_eq!(osc.state(), ResidualState::Correcting);
        for _ in 0..4 {
            osc.step();
        }
        assert_eq!(osc.state(), ResidualState::Steady);
    }

    #[test]
    fn square_and_triangle_stay_bounded() {
        for waveform in [OscillatorWaveform::Square, OscillatorWaveform::Triangle] {
            for order in [ResidualOrder::Four, ResidualOrder::Six, ResidualOrder::Eight] {
                for freq in [0.001, 0.0371, 0.2, 0.49] {
                    let out = render(waveform, order, freq, 4096);
                    let peak = out.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
                    assert!(
                        peak.is_finite() && peak < 1.3,
                        "{} order {} at {freq}: peak {peak}",
                        waveform.name(),
                        order.points()
                    );
                }
            }
        }
    }

    #[test]
    fn triangle_corrections_scale_with_frequency() {
        let freq = 0.001;
        let out = render(OscillatorWaveform::Triangle, ResidualOrder::Eight, freq, 3000);
        let worst = out
            .iter()
            .enumerate()
            .skip(4)
            .map(|(n, &s)| {
                let phase = ((n - 4) as f64 * freq).fract();
                (s as f64 - OscillatorWaveform::Triangle.naive(phase)).abs()
            })
            .fold(0.0, f64::max);
        assert!(worst < 8.0 * freq, "worst deviation {worst}");
    }

    #[test]
    fn zero_frequency_holds_value() {
        let mut osc = ResidualOscillator::new(OscillatorWaveform::Square, ResidualOrder::Four);
        osc.reset(0.0, 0.25);
        let mut out = vec![0.0f32; 32];
        osc.render(&mut out);
        assert!(out[2..].iter().all(|&s| s == 1.0));
        assert_eq!(osc.state(), ResidualState::Steady);
    }
}
