//! Engine configuration shared by [`Retune`](crate::Retune) and [`Autotune`](crate::Autotune).

use crate::solad::MAX_BLOCK;
use warble_analysis::DetectionConfig;
use warble_core::{AudioContext, Error, Result};

/// Layout and tuning of a multi-voice pitch engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Estimator and per-voice output buffer length in samples.
    pub buffer_size: usize,
    /// Samples per analysis frame; also the SOLAD block size.
    pub frame_size: usize,
    /// Envelope update interval in samples.
    pub hop_size: usize,
    /// Envelope window in samples; attacks snap the read lag to this.
    pub window_size: usize,
    /// Attack-detector decay time constant in milliseconds.
    pub time_constant_ms: f32,
    pub fidelity_threshold: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            frame_size: 256,
            hop_size: 64,
            window_size: 64,
            time_constant_ms: 100.0,
            fidelity_threshold: 0.95,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_size == 0
            || self.buffer_size % self.frame_size != 0
            || self.buffer_size / self.frame_size < 2
        {
            return Err(Error::InvalidFrameLayout {
                buffer_size: self.buffer_size,
                frame_size: self.frame_size,
            });
        }
        if self.frame_size > MAX_BLOCK {
            return Err(Error::InvalidConfig(format!(
                "frame_size {} exceeds {}",
                self.frame_size, MAX_BLOCK
            )));
        }
        if self.hop_size == 0 {
            return Err(Error::InvalidConfig("hop_size must be non-zero".into()));
        }
        if !(self.time_constant_ms > 0.0 && self.time_constant_ms.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "time_constant_ms {} must be positive",
                self.time_constant_ms
            )));
        }
        Ok(())
    }

    /// Estimator settings matching this layout.
    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig {
            buffer_size: self.buffer_size,
            frame_size: self.frame_size,
            hop_size: self.hop_size,
            window_size: self.window_size,
            fidelity_threshold: self.fidelity_threshold,
            ..Default::default()
        }
    }
}

/// Per-hop decay of the attack detector's running maximum:
/// `exp(-1000·hop / (sr·tc_ms))`.
pub fn decay_radius(ctx: &AudioContext, hop_size: usize, time_constant_ms: f32) -> f32 {
    libm::expf(-1000.0 * hop_size as f32 * ctx.inv_sample_rate() / time_constant_ms)
}
