//! Parameter changes delivered from a control thread to the audio thread.
//!
//! The audio callback owns the nodes. Anything else (UI, MIDI, automation)
//! pushes [`ControlMessage`]s into a lock-free SPSC ring; [`Controlled`]
//! drains it at the top of every block, so parameters only ever change
//! between blocks.

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{
    dsp::{oscillator::Oscillator, window::WindowKind},
    graph::{
        chorus::ChorusNode,
        delay::DelayNode,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Delay in samples (fractional).
    SetDelay { samples: f64 },
    /// Upper bound on the resampler's anti-aliasing cutoff, cycles/sample.
    SetCutoff { cutoff: f64 },
    /// Oscillator pitch or LFO rate in Hz.
    SetFrequency { hz: f64 },
    /// New delay bound, clamped to what the delay line already has room for.
    SetMaxDelay { samples: usize },
    SetWindow(WindowKind),
    /// Max delay change per sample; `None` disables slew limiting.
    SetSlewRate(Option<f64>),
    Reset,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// A node that reacts to control messages. Messages that do not apply are ignored.
pub trait Controllable {
    fn apply(&mut self, message: ControlMessage, ctx: &RenderCtx);
}

/// Wraps a node with a message receiver drained before each block.
pub struct Controlled<N, R> {
    node: N,
    rx: R,
}

impl<N, R> Controlled<N, R> {
    pub fn new(node: N, rx: R) -> Self {
        Self { node, rx }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn into_inner(self) -> N {
        self.node
    }
}

impl<N, R> GraphNode for Controlled<N, R>
where
    N: GraphNode + Controllable,
    R: MessageReceiver + Send,
{
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Process control messages
        while let Some(message) = self.rx.pop() {
            self.node.apply(message, ctx);
        }
        self.node.render_block(out, ctx);
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        self.node.reset(ctx);
    }

    fn latency(&self) -> usize {
        self.node.latency()
    }
}

impl Controllable for DelayNode {
    fn apply(&mut self, message: ControlMessage, ctx: &RenderCtx) {
        match message {
            ControlMessage::SetDelay { samples } => self.set_delay_samples(samples),
            ControlMessage::SetCutoff { cutoff } => self.resampler_mut().set_cutoff(cutoff),
            ControlMessage::SetMaxDelay { samples } => {
                // Growing past the allocation would reallocate on the audio thread.
                let resampler = self.resampler_mut();
                let capacity = resampler.delay_capacity();
                if samples > capacity {
                    tracing::warn!(
                        requested = samples,
                        capacity,
                        "max delay exceeds the allocated line, clamping"
                    );
                }
                resampler.set_max_delay(samples.min(capacity));
            }
            ControlMessage::SetWindow(window) => self.resampler_mut().set_window(window),
            ControlMessage::SetSlewRate(rate) => self.resampler_mut().set_slew_rate(rate),
            ControlMessage::Reset => self.reset(ctx),
            ControlMessage::SetFrequency { .. } => {}
        }
    }
}

impl Controllable for ChorusNode {
    fn apply(&mut self, message: ControlMessage, ctx: &RenderCtx) {
        match message {
            ControlMessage::SetFrequency { hz } => self.set_rate(hz),
            ControlMessage::SetCutoff { cutoff } => self.resampler_mut().set_cutoff(cutoff),
            ControlMessage::SetWindow(window) => self.resampler_mut().set_window(window),
            ControlMessage::SetSlewRate(rate) => self.resampler_mut().set_slew_rate(rate),
            ControlMessage::Reset => self.reset(ctx),
            ControlMessage::SetDelay { .. } | ControlMessage::SetMaxDelay { .. } => {}
        }
    }
}

impl Controllable for OscNode {
    fn apply(&mut self, message: ControlMessage, ctx: &RenderCtx) {
        match message {
            ControlMessage::SetFrequency { hz } => {
                self.set_frequency(hz);
                let freq = self.frequency(ctx) / ctx.sample_rate;
                self.oscillator_mut().set_frequency(freq);
            }
            ControlMessage::Reset => self.reset(ctx),
            _ => {}
        }
    }
}
