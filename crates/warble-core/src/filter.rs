//! One-pole high-pass filter.

use crate::AudioContext;
use core::f32::consts::TAU;

/// DC blocker / one-pole high-pass.
///
/// `y[n] = x[n] - x[n-1] + R * y[n-1]` with `R = 1 - 2π·fc/sr`.
#[derive(Debug, Clone)]
pub struct Highpass {
    cutoff: f32,
    r: f32,
    xs: f32,
    ys: f32,
    inv_sample_rate: f32,
}

impl Highpass {
    pub fn new(ctx: &AudioContext, cutoff_hz: f32) -> Self {
        let mut hp = Self {
            cutoff: cutoff_hz,
            r: 0.0,
            xs: 0.0,
            ys: 0.0,
            inv_sample_rate: ctx.inv_sample_rate(),
        };
        hp.set_cutoff(cutoff_hz);
        hp
    }

    #[inline]
    pub fn tick(&mut self, input: f32) -> f32 {
        self.ys = input - self.xs + self.r * self.ys;
        self.xs = input;
        self.ys
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff = cutoff_hz.max(0.0);
        self.r = (1.0 - TAU * self.cutoff * self.inv_sample_rate).clamp(0.0, 1.0);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn reset(&mut self) {
        self.xs = 0.0;
        self.ys = 0.0;
    }
}
