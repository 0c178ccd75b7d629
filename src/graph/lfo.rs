use crate::{
    dsp::oscillator::{Oscillator, OscillatorBlock},
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO runs at sub-audio rates (0.01 - 20 Hz) to move parameters over time.
Its output is a control signal in [-1, 1], rendered a block at a time just
like audio, so a node can read one value per sample.

  // Vibrato source: 5.5 Hz sine
  let lfo = LfoNode::sine(5.5);

The sine LFO is the recursive generator: no trig calls per sample and no
drift over hours of playback. The other shapes reuse the band-limited
oscillators, which at LFO rates are indistinguishable from the ideal shapes
(their correction latency is a few samples).

See `dsp/lfo.rs` for unit conversions and depth formulas.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f64, // Fixed frequency in Hz (ignores note context)
    phase: f64,
}

impl LfoNode {
    fn new(osc: OscillatorBlock, frequency: f64) -> Self {
        Self {
            osc,
            frequency,
            phase: 0.0,
        }
    }

    pub fn sine(frequency: f64) -> Self {
        Self::new(OscillatorBlock::sine(), frequency)
    }

    pub fn sawtooth(frequency: f64) -> Self {
        Self::new(OscillatorBlock::sawtooth(), frequency)
    }

    pub fn square(frequency: f64) -> Self {
        Self::new(OscillatorBlock::square(), frequency)
    }

    pub fn triangle(frequency: f64) -> Self {
        Self::new(OscillatorBlock::triangle(), frequency)
    }

    /// Start phase in cycles, applied on the next reset.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // LFO's own frequency, not the note frequency
        self.osc.set_frequency(self.frequency / ctx.sample_rate);
        self.osc.render(out);
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        self.osc.reset(self.frequency / ctx.sample_rate, self.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_range(mut lfo: LfoNode, len: usize) {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        lfo.reset(&ctx);
        let mut buffer = vec![0.0; len];
        lfo.render_block(&mut buffer, &ctx);

        for &sample in &buffer {
            assert!(
                (-1.0..=1.0).contains(&sample),
                "LFO sample {} out of range [-1.0, 1.0]",
                sample
            );
        }
    }

    #[test]
    fn test_lfo_output_range() {
        assert_in_range(LfoNode::sine(5.0), 1024);
        assert_in_range(LfoNode::triangle(3.0), 2048);
        assert_in_range(LfoNode::square(10.0), 512);
        assert_in_range(LfoNode::sawtooth(7.0), 1024);
    }

    #[test]
    fn test_lfo_ignores_note_frequency() {
        let mut buffer1 = vec![0.0; 512];
        let mut buffer2 = vec![0.0; 512];

        let ctx1 = RenderCtx::from_freq(48000.0, 440.0);
        let ctx2 = RenderCtx::from_freq(48000.0, 880.0);

        let mut lfo = LfoNode::sine(5.0);
        lfo.reset(&ctx1);
        lfo.render_block(&mut buffer1, &ctx1);

        let mut lfo = LfoNode::sine(5.0);
        lfo.reset(&ctx2);
        lfo.render_block(&mut buffer2, &ctx2);

        assert_eq!(buffer1, buffer2);
    }

    #[test]
    fn test_lfo_phase_offset() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        let mut lfo = LfoNode::sine(1.0).with_phase(0.25);
        lfo.reset(&ctx);
        let mut buffer = vec![0.0; 4];
        lfo.render_block(&mut buffer, &ctx);
        assert!((buffer[0] - 1.0).abs() < 1e-6);
    }
}
