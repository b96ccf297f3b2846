//! SOLAD: synchronous overlap-add with dynamic read-pointer scheduling.

use crate::crossfade::{CrossfadeScheduler, MIN_PERIOD};
use crate::delay_ring::{DelayRing, LOOP_SIZE};
use warble_core::{Mempool, Result};

/// Longest block processed per [`Solad::io_samples`] call.
pub const MAX_BLOCK: usize = LOOP_SIZE / 4;

/// Time-domain pitch shifter over a single delay ring.
///
/// Each [`io_samples`](Self::io_samples) call writes one block into the ring
/// and reads one block back through the [`CrossfadeScheduler`], choosing the
/// pitch-up path when the factor is above 1.
///
/// ```
/// use warble_core::Mempool;
/// use warble_dsp::Solad;
///
/// let pool = Mempool::default();
/// let mut solad = Solad::new(&pool)?;
/// solad.set_period(100.0);
/// solad.set_pitch_factor(1.5);
///
/// let input = [0.0f32; 256];
/// let mut output = [0.0f32; 256];
/// solad.io_samples(&input, &mut output);
/// # Ok::<(), warble_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Solad {
    ring: DelayRing,
    xf: CrossfadeScheduler,
    block_size: usize,
}

impl Solad {
    pub fn new(pool: &Mempool) -> Result<Self> {
        Ok(Self {
            ring: DelayRing::new(pool)?,
            xf: CrossfadeScheduler::default(),
            block_size: crate::crossfade::INIT_PERIOD as usize,
        })
    }

    /// Write `input` into the ring and fill `output` with the shifted block.
    ///
    /// Both slices should have the same length; the shorter length is used,
    /// capped at [`MAX_BLOCK`]. Output samples past the cap are left untouched.
    pub fn io_samples(&mut self, input: &[f32], output: &mut [f32]) {
        let n = input.len().min(output.len()).min(MAX_BLOCK);

        self.block_size = n;
        self.ring.write(&input[..n]);

        if self.xf.pitch_factor > 1.0 {
            self.xf.pitch_up(&self.ring, &mut output[..n]);
        } else {
            self.xf.pitch_down(&self.ring, &mut output[..n]);
        }
    }

    /// Set the input period in samples.
    ///
    /// Clamped to [`max_period`](Self::max_period); values at or below
    /// [`MIN_PERIOD`] (and non-finite ones) are ignored.
    pub fn set_period(&mut self, period: f32) {
        if period.is_nan() {
            return;
        }
        let period = period.min(self.max_period());
        if period > MIN_PERIOD {
            self.xf.period = period;
        }
    }

    /// Intended range is 0.25..=4. Non-positive and non-finite factors are ignored.
    pub fn set_pitch_factor(&mut self, pitch_factor: f32) {
        if pitch_factor > 0.0 && pitch_factor.is_finite() {
            self.xf.pitch_factor = pitch_factor;
        }
    }

    /// Pull the read pointer forward to `lag` samples behind the writer.
    /// Larger lags are rejected.
    pub fn set_read_lag(&mut self, lag: f32) {
        self.xf.set_read_lag(lag);
    }

    /// Zero the ring and restore scheduler defaults. The pitch factor is kept.
    pub fn reset_state(&mut self) {
        self.ring.clear();
        self.xf.reset();
        self.block_size = crate::crossfade::INIT_PERIOD as usize;
    }

    /// Longest period the ring can hold for the current block size.
    #[inline]
    pub fn max_period(&self) -> f32 {
        LOOP_SIZE.saturating_sub(self.block_size) as f32 * 0.8
    }

    pub fn period(&self) -> f32 {
        self.xf.period
    }

    pub fn pitch_factor(&self) -> f32 {
        self.xf.pitch_factor
    }

    pub fn read_lag(&self) -> f32 {
        self.xf.read_lag
    }

    pub fn jump(&self) -> f32 {
        self.xf.jump
    }

    pub fn xfade_value(&self) -> f32 {
        self.xf.xfade_value
    }

    pub fn xfade_length(&self) -> f32 {
        self.xf.xfade_length
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn scheduler(&self) -> &CrossfadeScheduler {
        &self.xf
    }

    pub fn footprint(&self) -> usize {
        self.ring.footprint()
    }
}
