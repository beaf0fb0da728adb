//! Waveshaping distortion
//!
//! Distortion adds harmonics by reshaping the waveform through a transfer
//! function. Rather than evaluating the function per sample, we precompute
//! it once into a lookup table (the "curve") spanning inputs -1..=1, then
//! read the table with linear interpolation.
//!
//! # The curve
//!
//! ```text
//! f(x) = (3 + k) * x * 20° / (π + k * |x|)
//! ```
//!
//! `k` is the shaping amount. Near zero the curve is a gentle slope; as `k`
//! grows the knee sharpens and loud inputs flatten out, approaching a hard
//! clip:
//!
//! ```text
//!   k = 10                 k = 400
//!      out                    out
//!       │    ___              │  ______
//!       │  ╱                  │ │
//!   ────┼╱──── in         ────┼┼──── in
//!     _╱│                ____│|
//!       │                     │
//! ```
//!
//! Inputs outside -1..=1 read the first/last table entry.

use std::f32::consts::PI;

/// Table resolution (one second of entries at 44.1 kHz).
pub const CURVE_LEN: usize = 44_100;

/// Precomputed waveshaping transfer function.
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionCurve {
    table: Vec<f32>,
    amount: f32,
}

impl DistortionCurve {
    /// Build the table for shaping amount `k`.
    ///
    /// Returns `None` when `k` would make the table non-finite (NaN or
    /// infinite amounts, or a negative `k` that zeroes the denominator), so
    /// callers can leave the shaper out instead of failing the voice.
    pub fn new(amount: f32) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }

        let deg = PI / 180.0;
        let table: Vec<f32> = (0..CURVE_LEN)
            .map(|i| {
                let x = (i as f32 * 2.0) / CURVE_LEN as f32 - 1.0;
                (3.0 + amount) * x * 20.0 * deg / (PI + amount * x.abs())
            })
            .collect();

        table
            .iter()
            .all(|v| v.is_finite())
            .then_some(Self { table, amount })
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.table
    }

    /// Map one input sample through the curve.
    #[inline]
    pub fn shape(&self, sample: f32) -> f32 {
        let last = self.table.len() - 1;
        let position = (sample + 1.0) * 0.5 * last as f32;

        if position <= 0.0 || position.is_nan() {
            return self.table[0];
        }
        if position >= last as f32 {
            return self.table[last];
        }

        let index = position as usize;
        let frac = position - index as f32;
        self.table[index] + (self.table[index + 1] - self.table[index]) * frac
    }

    /// Shape a buffer in place.
    pub fn shape_buffer(&self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.shape(*sample);
        }
    }
}
