use std::sync::Arc;

use crate::dsp::{
    oscillator::{Oscillator, OscillatorBlock, OscillatorWaveform},
    residual::ResidualOrder,
    wavetable::Mipmap,
};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

Band-limited sound sources. Audio-rate oscillators must not alias: a naive
sawtooth at 5 kHz (48 kHz rate) has harmonics at 10, 15, 20, 25 kHz ... and
the ones above 24 kHz fold back to inharmonic frequencies. Two remedies:

  residual   (default)  naive waveform + PolyBLEP/PolyBLAMP corrections.
             .with_order(ResidualOrder::Four) trades quality for latency.

  wavetable  band-limited tables per octave, shared between voices:
             let saw = Arc::new(Mipmap::new(OscillatorWaveform::Saw, 2048));
             let osc = OscNode::wavetable(saw.clone());

Sine uses the recursive generator either way.

Harmonic content:

  Sine      fundamental only
  Sawtooth  all harmonics, 1/n
  Square    odd harmonics, 1/n
  Triangle  odd harmonics, 1/n²

Example usage:
  let osc = OscNode::sine();
  let osc = OscNode::sawtooth().with_detune(7.0);
  let osc = OscNode::square().with_frequency(110.0);   // ignores note pitch
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    base_frequency: Option<f64>,
    /// Detune in cents. 100 cents = 1 semitone.
    detune_cents: f64,
    /// False until the oscillator has been seeded by `reset` or the first block.
    primed: bool,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
            detune_cents: 0.0,
            primed: false,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    pub fn waveform(waveform: OscillatorWaveform, order: ResidualOrder) -> Self {
        Self::new(OscillatorBlock::residual(waveform, order))
    }

    pub fn wavetable(mipmap: Arc<Mipmap>) -> Self {
        Self::new(OscillatorBlock::wavetable(mipmap))
    }

    /// Switch a residual oscillator to another correction order.
    pub fn with_order(mut self, order: ResidualOrder) -> Self {
        if matches!(self.osc, OscillatorBlock::Residual(_)) {
            self.osc = OscillatorBlock::residual(self.osc.waveform(), order);
        }
        self
    }

    /// Set a fixed frequency, ignoring the note pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f64) -> Self {
        self.base_frequency = Some(freq);
        self
    }

    /// Set detune in cents (100 cents = 1 semitone).
    pub fn with_detune(mut self, cents: f64) -> Self {
        self.detune_cents = cents;
        self
    }

    /// Replace the fixed frequency (Hz).
    pub fn set_frequency(&mut self, freq: f64) {
        self.base_frequency = Some(freq);
    }

    pub fn oscillator(&self) -> &OscillatorBlock {
        &self.osc
    }

    pub fn oscillator_mut(&mut self) -> &mut OscillatorBlock {
        &mut self.osc
    }

    /// Frequency in Hz this node plays for `ctx`.
    pub fn frequency(&self, ctx: &RenderCtx) -> f64 {
        let base = self.base_frequency.unwrap_or(ctx.frequency);
        if self.detune_cents != 0.0 {
            base * (self.detune_cents / 1200.0).exp2()
        } else {
            base
        }
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let freq = self.frequency(ctx) / ctx.sample_rate;
        if self.primed {
            self.osc.set_frequency(freq);
        } else {
            self.osc.reset(freq, 0.0);
            self.primed = true;
        }
        self.osc.render(out);
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        let freq = self.frequency(ctx) / ctx.sample_rate;
        self.osc.reset(freq, 0.0);
        self.primed = true;
    }

    fn latency(&self) -> usize {
        self.osc.latency()
    }
}
