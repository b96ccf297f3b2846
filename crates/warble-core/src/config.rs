//! Audio context: the sample rate every time-based unit is built against.

use crate::{Error, Result};

/// Immutable sample-rate context.
///
/// Replaces a process-wide sample rate: every unit that converts between
/// samples and seconds takes one at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioContext {
    sample_rate: f32,
    inv_sample_rate: f32,
}

impl Default for AudioContext {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            inv_sample_rate: 1.0 / 44100.0,
        }
    }
}

impl AudioContext {
    pub const MIN_SAMPLE_RATE: f32 = 8000.0;
    pub const MAX_SAMPLE_RATE: f32 = 384000.0;

    pub fn new(sample_rate: f32) -> Result<Self> {
        if !(Self::MIN_SAMPLE_RATE..=Self::MAX_SAMPLE_RATE).contains(&sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                sample_rate
            )));
        }
        Ok(Self {
            sample_rate,
            inv_sample_rate: 1.0 / sample_rate,
        })
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[inline]
    pub fn inv_sample_rate(&self) -> f32 {
        self.inv_sample_rate
    }

    /// Milliseconds to samples, rounded down.
    #[inline]
    pub fn ms_to_samples(&self, ms: f32) -> usize {
        (ms * 0.001 * self.sample_rate) as usize
    }
}
