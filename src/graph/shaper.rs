use std::sync::Arc;

use crate::dsp::distortion::DistortionCurve;
use crate::graph::node::{GraphNode, RenderCtx};

/// Waveshaper: maps every sample through a precomputed distortion curve.
///
/// The curve is shared, so several voices built from the same amount can
/// point at one table.
pub struct ShaperNode {
    curve: Arc<DistortionCurve>,
}

impl ShaperNode {
    pub fn new(curve: Arc<DistortionCurve>) -> Self {
        Self { curve }
    }

    /// Build a shaper for amount `k`, or `None` if the curve is unusable.
    pub fn with_amount(amount: f32) -> Option<Self> {
        DistortionCurve::new(amount).map(|curve| Self::new(Arc::new(curve)))
    }

    pub fn curve(&self) -> &DistortionCurve {
        &self.curve
    }
}

impl GraphNode for ShaperNode {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        self.curve.shape_buffer(out);
    }
}
