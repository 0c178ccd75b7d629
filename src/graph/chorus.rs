use crate::{
    dsp::{
        delay::Resampler,
        lfo::{ms_to_samples, vibrato_depth_samples},
        oscillator::{Oscillator, SineOscillator},
    },
    graph::node::{GraphNode, RenderCtx},
};

/*
Modulated Delay (Chorus / Vibrato)
==================================

A delay whose length is swept by an LFO resamples its input: while the delay
shrinks the read head runs faster than the write head and the pitch goes up,
while it grows the pitch goes down.

  delay[n] = base + depth · sin(2π · rate · n)

Mixed with the dry signal this is chorus. Alone (mix = 1) it is vibrato.

Parameters
----------

Rate (0.1 - 7 Hz):
  LFO speed. Chorus sits around 0.5 - 1.5 Hz, vibrato around 5 - 6 Hz.

Depth (ms):
  How far the delay swings. Chorus: 1-3 ms. For vibrato, prefer
  `ChorusNode::vibrato`, which takes the swing in cents.

Base delay (~20 ms):
  Center of the sweep. Must stay above the depth so the delay never goes
  negative.

The LFO runs per sample (recursive sine) and every output sample comes from
the resampler's sinc reader, so the sweep has no zipper noise and the
anti-aliasing cutoff follows the instantaneous read rate.

Example usage:

  let lush_pad = OscNode::sawtooth()
      .through(ChorusNode::new(48_000.0, 0.8, 2.0, 0.4));

  let warble = OscNode::triangle()
      .through(ChorusNode::vibrato(48_000.0, 5.5, 30.0));
*/

const MAX_BASE_DELAY_MS: f64 = 50.0;
const MAX_DEPTH_MS: f64 = 20.0;

/// Chorus effect - thickens sound with modulated delay
pub struct ChorusNode {
    resampler: Resampler,
    lfo: SineOscillator,
    sample_rate: f64,
    rate: f64,          // LFO Hz
    depth_samples: f64, // Sweep amplitude
    base_samples: f64,  // Sweep center
    mix: f32,           // Dry/wet
}

impl ChorusNode {
    /// Create a new chorus effect.
    ///
    /// - `rate`: LFO speed in Hz (0.1-5.0 typical, 0.8-1.5 classic)
    /// - `depth_ms`: Modulation depth in milliseconds (1-5 typical)
    /// - `mix`: Dry/wet blend (0.0 = dry, 1.0 = wet, 0.3-0.5 typical)
    pub fn new(sample_rate: f64, rate: f64, depth_ms: f64, mix: f32) -> Self {
        let max_delay =
            ms_to_samples(MAX_BASE_DELAY_MS + MAX_DEPTH_MS, sample_rate).ceil() as usize;
        let mut node = Self {
            resampler: Resampler::new(max_delay, 32),
            lfo: SineOscillator::default(),
            sample_rate,
            rate: rate.clamp(0.01, 20.0),
            depth_samples: 0.0,
            base_samples: ms_to_samples(20.0, sample_rate),
            mix: mix.clamp(0.0, 1.0),
        };
        node.set_depth_ms(depth_ms);
        node.restart_lfo();
        node
    }

    /// Pure pitch vibrato swinging ±`cents` at `rate` Hz.
    pub fn vibrato(sample_rate: f64, rate: f64, cents: f64) -> Self {
        let mut node = Self::new(sample_rate, rate, 0.0, 1.0);
        let depth = vibrato_depth_samples(cents.abs(), node.rate / sample_rate);
        let max_depth = ms_to_samples(MAX_DEPTH_MS, sample_rate);
        node.depth_samples = depth.min(max_depth);
        // Keep the whole sweep clear of the kernel's minimum delay.
        node.base_samples = node.depth_samples + 16.0;
        node
    }

    /// Set the base delay time (default 20ms).
    pub fn with_base_delay(mut self, ms: f64) -> Self {
        self.base_samples = ms_to_samples(ms.clamp(0.0, MAX_BASE_DELAY_MS), self.sample_rate);
        self
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate.clamp(0.01, 20.0);
    }

    pub fn set_depth_ms(&mut self, depth_ms: f64) {
        self.depth_samples = ms_to_samples(depth_ms.clamp(0.0, MAX_DEPTH_MS), self.sample_rate);
    }

    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Delay swing in samples.
    pub fn depth_samples(&self) -> f64 {
        self.depth_samples
    }

    /// Center delay in samples.
    pub fn base_samples(&self) -> f64 {
        self.base_samples
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    pub fn resampler_mut(&mut self) -> &mut Resampler {
        &mut self.resampler
    }

    fn restart_lfo(&mut self) {
        self.lfo.reset(self.rate / self.sample_rate, 0.0);
    }
}

impl GraphNode for ChorusNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.lfo.set_frequency(self.rate / self.sample_rate);

        for sample in out.iter_mut() {
            let (lfo, _) = self.lfo.step_quadrature();
            let delay = self.base_samples + self.depth_samples * lfo;

            let dry = *sample;
            let wet = self.resampler.process(dry, delay);
            *sample = dry * (1.0 - self.mix) + wet * self.mix;
        }
    }

    fn reset(&mut self, _ctx: &RenderCtx) {
        self.resampler.clear();
        self.restart_lfo();
    }

    fn latency(&self) -> usize {
        self.base_samples.round() as usize
    }
}
