//! Default periodicity estimator: SNAC period tracking plus a power envelope.

use crate::{FrameCursor, FrameRing, PeriodicityEstimator, PowerEnvelope, Snac};
use warble_core::{Error, Mempool, Result};

/// Configuration for [`PeriodDetection`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionConfig {
    /// Input buffer length in samples. Must hold at least two frames.
    pub buffer_size: usize,
    /// Samples per analysis frame.
    pub frame_size: usize,
    /// Envelope update interval in samples.
    pub hop_size: usize,
    /// Envelope window in samples.
    pub window_size: usize,
    /// Upper bound for live envelope window changes.
    pub max_window_size: usize,
    /// Minimum peak height for a period to be accepted (0..1).
    pub fidelity_threshold: f32,
    pub snac_window: usize,
    pub snac_overlap: usize,
    /// Smoothing coefficient; 1.0 disables smoothing.
    pub alpha: f32,
    /// Relative change above which a new period snaps instead of smoothing.
    pub tolerance: f32,
    pub min_rms: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            frame_size: 256,
            hop_size: 64,
            window_size: 64,
            max_window_size: 1024,
            fidelity_threshold: 0.95,
            snac_window: crate::snac::DEFAULT_WINDOW,
            snac_overlap: 1,
            alpha: 1.0,
            tolerance: 1.0,
            min_rms: crate::snac::DEFAULT_MIN_RMS,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hop_size == 0 {
            return Err(Error::InvalidConfig("hop_size must be non-zero".into()));
        }
        if self.window_size == 0 || self.window_size > self.max_window_size {
            return Err(Error::InvalidConfig(format!(
                "window_size {} must be in 1..={}",
                self.window_size, self.max_window_size
            )));
        }
        if !(0.0..=1.0).contains(&self.fidelity_threshold) {
            return Err(Error::InvalidConfig(format!(
                "fidelity_threshold {} outside 0..=1",
                self.fidelity_threshold
            )));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "alpha {} outside (0, 1]",
                self.alpha
            )));
        }
        if !(self.tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance {} must be non-negative",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Frame-clocked period estimator.
///
/// Input is collected into a [`FrameRing`]. Each completed frame is fed to the
/// power envelope and to [`Snac`]; a period is accepted only when its fidelity
/// exceeds the threshold, otherwise the previous one is held.
#[derive(Debug)]
pub struct PeriodDetection {
    ring: FrameRing,
    envelope: PowerEnvelope,
    snac: Snac,
    period: f32,
    fidelity_threshold: f32,
    alpha: f32,
    tolerance: f32,
}

impl PeriodDetection {
    pub fn new(pool: &Mempool, config: &DetectionConfig) -> Result<Self> {
        config.validate()?;

        let ring = FrameRing::new(pool, config.buffer_size, config.frame_size)?;
        let envelope = PowerEnvelope::new(
            pool,
            config.max_window_size,
            config.window_size,
            config.hop_size,
        )?;
        let mut snac = Snac::new(pool, config.snac_window, config.snac_overlap)?;
        snac.set_min_rms(config.min_rms);

        tracing::debug!(
            buffer_size = config.buffer_size,
            frame_size = config.frame_size,
            snac_window = config.snac_window,
            "period detection built"
        );

        Ok(Self {
            ring,
            envelope,
            snac,
            period: 0.0,
            fidelity_threshold: config.fidelity_threshold,
            alpha: config.alpha,
            tolerance: config.tolerance,
        })
    }

    /// Fidelity of the most recent analysis.
    pub fn fidelity(&self) -> f32 {
        self.snac.fidelity()
    }

    pub fn fidelity_threshold(&self) -> f32 {
        self.fidelity_threshold
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn footprint(&self) -> usize {
        self.ring.footprint() + self.envelope.footprint() + self.snac.footprint()
    }

    fn accept(&mut self, candidate: f32) {
        if !candidate.is_finite() || candidate <= 0.0 {
            return;
        }

        let previous = self.period;
        self.period = if previous <= 0.0
            || libm::fabsf(candidate - previous) > self.tolerance * previous
        {
            candidate
        } else {
            self.alpha * candidate + (1.0 - self.alpha) * previous
        };
    }
}

impl PeriodicityEstimator for PeriodDetection {
    fn tick(&mut self, sample: f32) -> f32 {
        if self.ring.push(sample) {
            let frame = self.ring.frame();
            self.envelope.process_block(frame);
            if self.snac.process_block(frame) && self.snac.fidelity() > self.fidelity_threshold {
                let candidate = self.snac.period();
                self.accept(candidate);
            }
        }
        self.period
    }

    #[inline]
    fn period(&self) -> f32 {
        self.period
    }

    #[inline]
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

    #[inline]
    fn frame_ready(&self) -> bool {
        self.ring.frame_ready()
    }

    #[inline]
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

    fn set_fidelity_threshold(&mut self, threshold: f32) {
        if threshold.is_finite() {
            self.fidelity_threshold = threshold.clamp(0.0, 1.0);
        }
    }

    fn set_alpha(&mut self, alpha: f32) {
        if alpha.is_finite() {
            self.alpha = alpha.clamp(0.0, 1.0);
        }
    }

    fn set_tolerance(&mut self, tolerance: f32) {
        if tolerance.is_finite() {
            self.tolerance = tolerance.max(0.0);
        }
    }

    fn reset(&mut self) {
        self.ring.reset();
        self.envelope.reset();
        self.snac.reset();
        self.period = 0.0;
    }
}
