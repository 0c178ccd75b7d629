use crate::dsp::lfo::{hz_to_normalized, midi_note_to_hz};

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frequency: Pitch to render (Hz)
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f64,
    pub frequency: f64,
}

impl RenderCtx {
    /// Create context from a MIDI note; fractional notes carry pitch bend.
    pub fn from_note(sample_rate: f64, note: f64) -> Self {
        Self::from_freq(sample_rate, midi_note_to_hz(note))
    }

    /// Create context from a frequency in Hz.
    pub fn from_freq(sample_rate: f64, frequency: f64) -> Self {
        Self {
            sample_rate,
            frequency,
        }
    }

    /// `frequency` in cycles/sample.
    #[inline]
    pub fn normalized_frequency(&self) -> f64 {
        hz_to_normalized(self.frequency, self.sample_rate)
    }
}

/// Core trait for block-based processing nodes
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Return to the freshly built state (phase, delay history).
    ///
    /// Default implementation does nothing (stateless nodes).
    fn reset(&mut self, _ctx: &RenderCtx) {}

    /// Samples of delay this node adds between its input (or phase) and output.
    fn latency(&self) -> usize {
        0
    }
}

/// Allow boxed graph nodes to be used as graph nodes (for dynamic dispatch)
impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        (**self).reset(ctx)
    }

    fn latency(&self) -> usize {
        (**self).latency()
    }
}
