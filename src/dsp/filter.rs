use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type      | passes          | rejects      | voice use                  |
| --------- | --------------- | ------------ | -------------------------- |
| low-pass  | below cutoff    | above cutoff | kick body, acid sweep      |
| high-pass | above cutoff    | below cutoff | noise hat                  |
| band-pass | around cutoff   | both sides   | dub stab                   |

Q follows the biquad convention: 0.707 is flat, larger values ring at the
cutoff. Internally the SVF damping is k = 1 / Q.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

/// Topology-preserving-transform state-variable filter.
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

/// Lowest Q accepted; keeps the damping term finite.
const MIN_Q: f32 = 0.05;

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q: std::f32::consts::FRAC_1_SQRT_2,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    fn compute_g(cutoff_hz: f32, sample_rate: f32) -> f32 {
        // Keep the prewarp away from Nyquist where tan() explodes
        let cutoff = cutoff_hz.clamp(10.0, sample_rate * 0.49);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    #[inline]
    fn damping(&self) -> f32 {
        1.0 / self.q.max(MIN_Q)
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    /// Pick the configured response. Band-pass is scaled by `k` so the
    /// centre frequency passes at unity regardless of Q.
    #[inline]
    fn select(&self, outputs: FilterOutputs, k: f32) -> f32 {
        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass * k,
        }
    }

    /// Filter in place at the current fixed cutoff.
    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        let g = Self::compute_g(self.cutoff_hz, sample_rate);
        let k = self.damping();

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs, k);
        }
    }

    /// Filter in place with one cutoff value per sample (swept filters).
    pub fn render_swept(&mut self, buffer: &mut [f32], cutoffs: &[f32], sample_rate: f32) {
        let k = self.damping();

        for (sample, &cutoff) in buffer.iter_mut().zip(cutoffs) {
            let g = Self::compute_g(cutoff, sample_rate);
            let outputs = self.next_sample(*sample, k, g);
            *sample = self.select(outputs, k);
        }
        if let Some(&last) = cutoffs.last() {
            self.cutoff_hz = last;
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}
