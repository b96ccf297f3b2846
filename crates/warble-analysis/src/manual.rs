//! Estimator whose period comes from the caller instead of analysis.

use crate::{FrameCursor, FrameRing, PeriodicityEstimator, PowerEnvelope};
use warble_core::{Mempool, Result};

/// Frame bookkeeping and envelope of [`PeriodDetection`](crate::PeriodDetection),
/// with the period supplied through [`set_period`](Self::set_period).
///
/// Useful when the pitch of the source is already known (a sequenced
/// oscillator, a MIDI note) and for driving the pitch shifters deterministically.
/// `tick` reports the supplied period verbatim, so out-of-range values reach
/// the consumer unscreened.
#[derive(Debug)]
pub struct ManualPeriod {
    ring: FrameRing,
    envelope: PowerEnvelope,
    period: f32,
}

impl ManualPeriod {
    pub fn new(
        pool: &Mempool,
        buffer_size: usize,
        frame_size: usize,
        window_size: usize,
        hop_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            ring: FrameRing::new(pool, buffer_size, frame_size)?,
            envelope: PowerEnvelope::new(pool, window_size.max(1024), window_size, hop_size)?,
            period: 0.0,
        })
    }

    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }

    pub fn footprint(&self) -> usize {
        self.ring.footprint() + self.envelope.footprint()
    }
}

impl PeriodicityEstimator for ManualPeriod {
    fn tick(&mut self, sample: f32) -> f32 {
        if self.ring.push(sample) {
            self.envelope.process_block(self.ring.frame());
        }
        self.period
    }

    fn period(&self) -> f32 {
        self.period
    }

    fn envelope(&self) -> f32 {
        self.envelope.value()
    }

    fn frame_size(&self) -> usize {
        self.ring.frame_size()
    }

    fn buffer_size(&self) -> usize {
        self.ring.buffer_size()
    }

    fn window_size(&self) -> usize {
        self.envelope.window_size()
    }

    fn frame_ready(&self) -> bool {
        self.ring.frame_ready()
    }

    fn cursor(&self) -> FrameCursor {
        self.ring.cursor()
    }

    fn input_frame(&self) -> &[f32] {
        self.ring.frame()
    }

    fn set_hop_size(&mut self, hop_size: usize) {
        self.envelope.set_hop_size(hop_size);
    }

    fn set_window_size(&mut self, window_size: usize) {
        self.envelope.set_window_size(window_size);
    }

    // No analysis, nothing to gate
    fn set_fidelity_threshold(&mut self, _threshold: f32) {}

    fn reset(&mut self) {
        self.ring.reset();
        self.envelope.reset();
    }
}
