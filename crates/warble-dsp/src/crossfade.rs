//! Read-pointer scheduling for SOLAD.
//!
//! The read pointer trails the write pointer by `read_lag` samples and moves at
//! `pitch_factor` samples per output sample. Left alone it would either fall
//! ever further behind (factor < 1) or overtake the writer (factor > 1), so it
//! periodically jumps by whole periods of the input. Each jump is masked by a
//! linear crossfade from the pre-jump tap to the post-jump tap.
//!
//! ```text
//!   xfade_value  1 ─┐
//!                   │ ╲            old tap weight = xfade_value
//!                   │   ╲          new tap weight = 1 - xfade_value
//!                0 ─┼─────╲──────
//!              -1 ─ idle sentinel
//! ```

use crate::delay_ring::DelayRing;

/// Period the scheduler starts (and resets) with.
pub const INIT_PERIOD: f32 = 64.0;

/// Shortest accepted period; shorter estimates are treated as noise.
pub const MIN_PERIOD: f32 = 8.0;

/// No active crossfade.
pub const XFADE_IDLE: f32 = -1.0;

/// Lag-tracking state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossfadeScheduler {
    pub(crate) read_lag: f32,
    pub(crate) period: f32,
    pub(crate) pitch_factor: f32,
    pub(crate) jump: f32,
    pub(crate) xfade_value: f32,
    pub(crate) xfade_length: f32,
}

impl Default for CrossfadeScheduler {
    fn default() -> Self {
        Self {
            read_lag: INIT_PERIOD,
            period: INIT_PERIOD,
            pitch_factor: 1.0,
            jump: 0.0,
            xfade_value: XFADE_IDLE,
            xfade_length: 0.0,
        }
    }
}

/// Ramp decrement per output sample. Lengths under one sample finish in one step.
#[inline]
fn xfade_step(speed: f32, length: f32) -> f32 {
    speed / length.max(1.0)
}

impl CrossfadeScheduler {
    /// Restore defaults, keeping the pitch factor.
    pub fn reset(&mut self) {
        *self = Self {
            pitch_factor: self.pitch_factor,
            ..Self::default()
        };
    }

    /// Force the lag down to `lag`, crossfading over `lag` samples.
    ///
    /// Requests that would increase the lag are ignored: the read pointer only
    /// ever jumps toward the writer through this call.
    pub fn set_read_lag(&mut self, lag: f32) {
        if lag.is_nan() {
            return;
        }
        let lag = lag.max(0.0);
        if lag < self.read_lag {
            self.jump = self.read_lag - lag;
            self.read_lag = lag;
            self.xfade_length = lag;
            self.xfade_value = 1.0;
        }
    }

    /// Read one block for `pitch_factor <= 1`.
    ///
    /// The lag grows by `1 - pitch_factor` per sample; whenever it exceeds a
    /// period and no crossfade is running, the pointer jumps forward by the
    /// largest power-of-two multiple of the period that still fits in the lag.
    pub fn pitch_down(&mut self, ring: &DelayRing, out: &mut [f32]) {
        let mut ref_index = ring.reference_index();
        let period = self.period;
        let lag_step = 1.0 - self.pitch_factor;

        // Extreme slow-downs get a shorter fade to limit duplicated material
        let speed = if self.pitch_factor > 0.5 {
            self.pitch_factor
        } else {
            1.0 - self.pitch_factor
        };
        let mut step = xfade_step(speed, self.xfade_length);

        for sample in out.iter_mut() {
            if self.read_lag > period && self.xfade_value <= 0.0 {
                let mut jump = period;
                while jump * 2.0 < self.read_lag {
                    jump *= 2.0;
                }
                self.jump = jump;
                self.read_lag -= jump;
                self.xfade_value = 1.0;
                self.xfade_length = period - 1.0;
                step = xfade_step(speed, self.xfade_length);
            }

            *sample = self.blend(ring, ref_index - self.read_lag, step);
            ref_index += 1.0;
            self.read_lag += lag_step;
        }
    }

    /// Read one block for `pitch_factor > 1`.
    ///
    /// The lag shrinks by `pitch_factor - 1` per sample. Below
    /// `limit = period·(pf - 0.99)/pf²` the pointer jumps back one period; the
    /// fade length is whatever the remaining lag allows. A crossfade in progress
    /// is only interrupted if the lag has gone negative. A ramp that has
    /// reached exactly zero counts as finished.
    pub fn pitch_up(&mut self, ring: &DelayRing, out: &mut [f32]) {
        let mut ref_index = ring.reference_index();
        let period = self.period;
        let lag_step = self.pitch_factor - 1.0;
        let speed = self.pitch_factor * self.pitch_factor;
        let limit_factor = (self.pitch_factor - 0.99) / speed;
        let limit = period * limit_factor;
        let mut step = xfade_step(speed, self.xfade_length);

        // Latency reduction once per block, never mid-fade
        if self.read_lag > period + 2.0 * limit && self.xfade_value <= 0.0 {
            let mut jump = period;
            while jump * 2.0 < self.read_lag - 2.0 * limit {
                jump *= 2.0;
            }
            self.jump = jump;
            self.read_lag -= jump;
            self.xfade_value = 1.0;
            self.xfade_length = period - 1.0;
            step = xfade_step(speed, self.xfade_length);
        }

        for sample in out.iter_mut() {
            if self.read_lag < limit && (self.xfade_value <= 0.0 || self.read_lag < 0.0) {
                self.xfade_length = (self.read_lag / limit_factor).max(1.0);
                step = xfade_step(speed, self.xfade_length);
                self.jump = -period;
                self.read_lag += period;
                self.xfade_value = 1.0;
            }

            *sample = self.blend(ring, ref_index - self.read_lag, step);
            ref_index += 1.0;
            self.read_lag -= lag_step;
        }
    }

    #[inline]
    fn blend(&mut self, ring: &DelayRing, read_index: f32, step: f32) -> f32 {
        let mut out = ring.read_interpolated(read_index);
        if self.xfade_value > 0.0 {
            out *= 1.0 - self.xfade_value;
            out += ring.read_interpolated(read_index - self.jump) * self.xfade_value;
            self.xfade_value -= step;
        }
        out
    }
}
