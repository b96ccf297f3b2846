//! Multi-voice pitch correction to fixed target frequencies.

use crate::bank::VoiceBank;
use crate::{EngineConfig, PitchShift};
use warble_analysis::{PeriodDetection, PeriodicityEstimator};
use warble_core::{AudioContext, Mempool, Result};

/// Raw periods at or above this many samples are treated as unvoiced input.
pub const UNVOICED_PERIOD: f32 = 1000.0;

/// N voices, each retuning the input to its own target frequency.
///
/// Raw estimates at or above [`UNVOICED_PERIOD`] (consonants, noise) are
/// discarded and the last accepted period is held, so voices keep their
/// factor through unvoiced passages.
///
/// A voice whose target is 0 Hz (the initial state) passes the input
/// through unshifted until a target is set.
#[derive(Debug)]
pub struct Autotune<E = PeriodDetection> {
    bank: VoiceBank<E>,
}

impl Autotune<PeriodDetection> {
    pub fn new(
        pool: &Mempool,
        ctx: &AudioContext,
        num_voices: usize,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let estimator = PeriodDetection::new(pool, &config.detection())?;
        Self::with_estimator(pool, ctx, num_voices, config, estimator)
    }
}

impl<E: PeriodicityEstimator> Autotune<E> {
    pub fn with_estimator(
        pool: &Mempool,
        ctx: &AudioContext,
        num_voices: usize,
        config: EngineConfig,
        estimator: E,
    ) -> Result<Self> {
        Ok(Self {
            bank: VoiceBank::build(pool, ctx, num_voices, config, estimator, 0.0)?,
        })
    }

    /// Process one input sample. Returns one output per voice.
    #[inline]
    pub fn tick(&mut self, sample: f32) -> &[f32] {
        let raw = self.bank.estimator_mut().tick(sample);
        if raw.is_finite() && raw < UNVOICED_PERIOD {
            self.bank.input_period = raw;
        }

        let period = self.bank.input_period;
        self.bank.run(|voice, estimator, freq| {
            if freq > 0.0 {
                voice.shift_to_freq_with_period(estimator, period, freq)
            } else {
                voice.shift_with_period(estimator, period, 1.0)
            }
        })
    }

    /// Tear down and rebuild with `num_voices` voices; see
    /// [`Retune::rebuild`](crate::Retune::rebuild). Targets reset to 0 Hz.
    pub fn rebuild(self, num_voices: usize) -> Result<Self> {
        Ok(Self {
            bank: self.bank.rebuild(num_voices, 0.0)?,
        })
    }

    /// Target frequency in Hz for one voice.
    pub fn set_freq(&mut self, voice: usize, freq: f32) -> Result<()> {
        self.bank.set_target(voice, freq)
    }

    /// Same target for every voice.
    pub fn set_freqs(&mut self, freq: f32) {
        self.bank.set_targets(freq);
    }

    pub fn freqs(&self) -> &[f32] {
        self.bank.targets()
    }

    pub fn set_time_constant(&mut self, time_constant_ms: f32) {
        self.bank.set_time_constant(time_constant_ms);
    }

    pub fn set_hop_size(&mut self, hop_size: usize) {
        self.bank.set_hop_size(hop_size);
    }

    pub fn set_window_size(&mut self, window_size: usize) {
        self.bank.set_window_size(window_size);
    }

    pub fn set_fidelity_threshold(&mut self, threshold: f32) {
        self.bank.set_fidelity_threshold(threshold);
    }

    /// Period smoothing coefficient forwarded to the estimator.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.bank.estimator_mut().set_alpha(alpha);
    }

    /// Relative period jump beyond which the estimator stops smoothing.
    pub fn set_tolerance(&mut self, tolerance: f32) {
        self.bank.estimator_mut().set_tolerance(tolerance);
    }

    /// Last accepted input period in samples (0 until one is found).
    pub fn input_period(&self) -> f32 {
        self.bank.input_period
    }

    pub fn input_period_secs(&self) -> f32 {
        self.bank.input_period_secs()
    }

    pub fn input_freq(&self) -> f32 {
        self.bank.input_freq()
    }

    pub fn outputs(&self) -> &[f32] {
        self.bank.outputs()
    }

    pub fn num_voices(&self) -> usize {
        self.bank.num_voices()
    }

    pub fn voice(&self, voice: usize) -> Option<&PitchShift> {
        self.bank.voice(voice)
    }

    pub fn estimator(&self) -> &E {
        self.bank.estimator()
    }

    pub fn estimator_mut(&mut self) -> &mut E {
        self.bank.estimator_mut()
    }

    pub fn config(&self) -> &EngineConfig {
        self.bank.config()
    }

    pub fn radius(&self) -> f32 {
        self.bank.radius()
    }

    pub fn pool(&self) -> &Mempool {
        self.bank.pool()
    }

    pub fn footprint(&self) -> usize {
        self.bank.footprint()
    }
}
