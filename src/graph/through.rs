use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two nodes in series, passing the output of the first (source)
into the second (effect). Every voice is built from these links:
oscillator → shaper → filter → gain.

How It Works:
-------------
1. Render the source into the output buffer
2. Pass that buffer through the effect (in-place processing)

  Source renders:  [0.5, 0.8, -0.3, 0.9, ...]
  Effect processes in-place (e.g., filter)
  Final output:    [0.4, 0.6, -0.2, 0.7, ...]  (filtered result)

Voice chains:
-------------

  Sampled kick:  sample ──→ lowpass ──→ (shaper) ──→ gain
  Noise hat:     noise  ──→ highpass ──→ decay gain ──→ gain
  Acid bass:     saw    ──→ shaper ──→ swept lowpass ──→ gain
  Dub stab:      saw    ──→ bandpass ──→ gain

Signal Flow Diagram:
--------------------
  Through: [Source] ──→ [Effect] ──→ output

A chain is active while either side is; for voices the source decides.
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

    fn is_active(&self) -> bool {
        self.source.is_active() || self.filter.is_active()
    }
}
