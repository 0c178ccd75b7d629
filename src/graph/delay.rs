use crate::{
    dsp::{delay::Resampler, lfo::ms_to_samples, sinc::Evaluation, window::WindowKind},
    graph::node::{GraphNode, RenderCtx},
};

/*
Fractional Delay
================

Delays the signal by any number of samples, fractional included:

  let delay = DelayNode::new(48_000.0, 50.0).with_delay_ms(12.34);

The delay line is sized once, from the sample rate and the longest delay it
will ever be asked for. Delay changes glide through the sinc reader, so a
block-to-block change is a short pitch bend rather than a click.
*/

pub struct DelayNode {
    resampler: Resampler,
    sample_rate: f64,
    delay_samples: f64,
}

impl DelayNode {
    /// Allocate for delays up to `max_delay_ms` at `sample_rate`.
    pub fn new(sample_rate: f64, max_delay_ms: f64) -> Self {
        let max_delay = ms_to_samples(max_delay_ms.max(0.0), sample_rate).ceil() as usize;
        Self::from_resampler(Resampler::new(max_delay, 64), sample_rate)
    }

    pub fn from_resampler(resampler: Resampler, sample_rate: f64) -> Self {
        Self {
            resampler,
            sample_rate,
            delay_samples: 0.0,
        }
    }

    pub fn with_delay_ms(mut self, ms: f64) -> Self {
        self.set_delay_ms(ms);
        self
    }

    pub fn with_delay_samples(mut self, samples: f64) -> Self {
        self.delay_samples = samples;
        self
    }

    pub fn with_window(mut self, window: WindowKind) -> Self {
        self.resampler.set_window(window);
        self
    }

    pub fn with_evaluation(self, evaluation: Evaluation) -> Self {
        Self {
            resampler: self.resampler.with_evaluation(evaluation),
            ..self
        }
    }

    pub fn set_delay_ms(&mut self, ms: f64) {
        self.delay_samples = ms_to_samples(ms, self.sample_rate);
    }

    pub fn set_delay_samples(&mut self, samples: f64) {
        self.delay_samples = samples;
    }

    pub fn delay_samples(&self) -> f64 {
        self.delay_samples
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    pub fn resampler_mut(&mut self) -> &mut Resampler {
        &mut self.resampler
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.resampler.render(out, self.delay_samples);
    }

    fn reset(&mut self, _ctx: &RenderCtx) {
        // Clear buffer here to avoid clicks
        self.resampler.clear();
    }

    fn latency(&self) -> usize {
        self.delay_samples.max(0.0).round() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_impulse_by_whole_samples() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        let mut node = DelayNode::new(48_000.0, 10.0).with_delay_samples(100.0);
        let mut buffer = vec![0.0f32; 256];
        buffer[0] = 1.0;
        node.render_block(&mut buffer, &ctx);

        assert!((buffer[100] - 1.0).abs() < 1e-5);
        assert!(buffer[..100].iter().all(|s| s.abs() < 1e-5));
    }

    #[test]
    fn ms_delay_uses_sample_rate() {
        let node = DelayNode::new(44_100.0, 100.0).with_delay_ms(10.0);
        assert!((node.delay_samples() - 441.0).abs() < 1e-9);
        assert!(node.resampler().max_delay() >= 4410);
    }

    #[test]
    fn reset_clears_history() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        let mut node = DelayNode::new(48_000.0, 10.0).with_delay_samples(32.5);
        let mut buffer = vec![1.0f32; 64];
        node.render_block(&mut buffer, &ctx);

        node.reset(&ctx);
        let mut silence = vec![0.0f32; 64];
        node.render_block(&mut silence, &ctx);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
