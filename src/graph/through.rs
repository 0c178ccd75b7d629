use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect). This is the fundamental building block for creating
signal processing chains like: oscillator → filter → delay.

How It Works:
-------------
1. Render the source into the output buffer
2. Pass that buffer through the effect (in-place processing)

  Source renders:  [0.5, 0.8, -0.3, 0.9, ...]
  Effect processes in-place (e.g., filter)
  Final output:    [0.4, 0.6, -0.2, 0.7, ...]  (filtered result)

Through passes audio through a processor that transforms it.

Common Use Cases:
-----------------

1. Pitched source into a modulated delay:

     let voice = OscNode::sawtooth()
         .through(ChorusNode::vibrato(48_000.0, 5.5, 30.0));

2. Fixed fractional offset between two otherwise identical sources:

     let late = OscNode::square()
         .through(DelayNode::new(48_000.0, 5.0).with_delay_samples(12.25));

3. Stacked effects:

     let wide = source
         .through(ChorusNode::new(48_000.0, 0.8, 2.0, 0.4))
         .through(ChorusNode::new(48_000.0, 1.3, 1.5, 0.3));

Signal Flow Diagram:
--------------------
  Through: [Source] ──→ [Effect] ──→ output

Latency adds up along the chain.
*/

pub struct Through<S, F> {
    source: S,
    filter: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.filter.render_block(out, ctx);
    }

    fn reset(&mut self, ctx: &RenderCtx) {
        self.source.reset(ctx);
        self.filter.reset(ctx);
    }

    fn latency(&self) -> usize {
        self.source.latency() + self.filter.latency()
    }
}
