//! Multi-voice pitch shifting by fixed factors.

use crate::bank::VoiceBank;
use crate::{EngineConfig, PitchShift};
use warble_analysis::{PeriodDetection, PeriodicityEstimator};
use warble_core::{AudioContext, Mempool, Result};

/// N voices shifting one input by per-voice pitch factors.
///
/// One estimator is fed each input sample, then every voice ticks against it.
/// All buffers come from the pool at construction; [`tick`](Self::tick) never
/// allocates.
///
/// ```
/// use warble_core::{AudioContext, Mempool};
/// use warble_dsp::{EngineConfig, Retune};
///
/// let pool = Mempool::default();
/// let ctx = AudioContext::new(48000.0)?;
/// let mut retune = Retune::new(&pool, &ctx, 2, EngineConfig::default())?;
/// retune.set_pitch_factor(0, 0.5)?;
/// retune.set_pitch_factor(1, 2.0)?;
///
/// let outputs = retune.tick(0.25);
/// assert_eq!(outputs.len(), 2);
/// # Ok::<(), warble_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Retune<E = PeriodDetection> {
    bank: VoiceBank<E>,
}

impl Retune<PeriodDetection> {
    /// Build with the default [`PeriodDetection`] estimator.
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

impl<E: PeriodicityEstimator> Retune<E> {
    /// Build around a caller-supplied estimator. Buffer and frame sizes are
    /// taken from the estimator; the rest of `config` is applied to it.
    pub fn with_estimator(
        pool: &Mempool,
        ctx: &AudioContext,
        num_voices: usize,
        config: EngineConfig,
        estimator: E,
    ) -> Result<Self> {
        Ok(Self {
            bank: VoiceBank::build(pool, ctx, num_voices, config, estimator, 1.0)?,
        })
    }

    /// Process one input sample. Returns one output per voice.
    #[inline]
    pub fn tick(&mut self, sample: f32) -> &[f32] {
        self.bank.input_period = self.bank.estimator_mut().tick(sample);
        self.bank.run(|voice, estimator, _| voice.shift(estimator))
    }

    /// Tear the engine down and build it again with `num_voices` voices.
    ///
    /// Destroys all scheduler, crossfade and buffered audio state, resets the
    /// estimator and every pitch factor to 1. Must not race the audio thread;
    /// taking `self` by value enforces exclusive access.
    pub fn rebuild(self, num_voices: usize) -> Result<Self> {
        Ok(Self {
            bank: self.bank.rebuild(num_voices, 1.0)?,
        })
    }

    pub fn set_pitch_factor(&mut self, voice: usize, pitch_factor: f32) -> Result<()> {
        self.bank.set_target(voice, pitch_factor)?;
        self.bank.voices_mut()[voice].set_pitch_factor(pitch_factor);
        Ok(())
    }

    /// Set every voice to the same factor.
    pub fn set_pitch_factors(&mut self, pitch_factor: f32) {
        self.bank.set_targets(pitch_factor);
        for voice in self.bank.voices_mut() {
            voice.set_pitch_factor(pitch_factor);
        }
    }

    pub fn pitch_factors(&self) -> &[f32] {
        self.bank.targets()
    }

    /// Attack-detector decay time constant in milliseconds.
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

    /// Last raw period from the estimator, in samples (0 until one is found).
    pub fn input_period(&self) -> f32 {
        self.bank.input_period
    }

    pub fn input_period_secs(&self) -> f32 {
        self.bank.input_period_secs()
    }

    /// Input frequency in Hz, 0 while no period is known.
    pub fn input_freq(&self) -> f32 {
        self.bank.input_freq()
    }

    /// Outputs of the last [`tick`](Self::tick).
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

    /// Mutable access to the estimator, e.g. to drive a
    /// [`ManualPeriod`](warble_analysis::ManualPeriod). Do not feed it samples
    /// directly; [`tick`](Self::tick) does that.
    pub fn estimator_mut(&mut self) -> &mut E {
        self.bank.estimator_mut()
    }

    pub fn config(&self) -> &EngineConfig {
        self.bank.config()
    }

    /// Current per-hop decay shared by all voices.
    pub fn radius(&self) -> f32 {
        self.bank.radius()
    }

    pub fn pool(&self) -> &Mempool {
        self.bank.pool()
    }

    /// Pool bytes held by the voices and output frame.
    pub fn footprint(&self) -> usize {
        self.bank.footprint()
    }
}
