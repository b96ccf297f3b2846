//! Voice bank shared by the retune and autotune engines.

use crate::config::{decay_radius, EngineConfig};
use crate::PitchShift;
use warble_analysis::PeriodicityEstimator;
use warble_core::{compat::Vec, AudioContext, Error, Mempool, PoolBuffer, Result};

/// N voices, one estimator, per-voice targets and the per-tick output frame.
#[derive(Debug)]
pub(crate) struct VoiceBank<E> {
    pool: Mempool,
    ctx: AudioContext,
    config: EngineConfig,
    estimator: E,
    voices: Vec<PitchShift>,
    targets: PoolBuffer,
    outputs: PoolBuffer,
    radius: f32,
    pub(crate) input_period: f32,
}

impl<E: PeriodicityEstimator> VoiceBank<E> {
    pub(crate) fn build(
        pool: &Mempool,
        ctx: &AudioContext,
        num_voices: usize,
        mut config: EngineConfig,
        mut estimator: E,
        default_target: f32,
    ) -> Result<Self> {
        if num_voices == 0 {
            return Err(Error::InvalidVoiceCount(num_voices));
        }

        // The estimator owns the buffer layout
        config.buffer_size = estimator.buffer_size();
        config.frame_size = estimator.frame_size();
        config.validate()?;

        estimator.set_hop_size(config.hop_size);
        estimator.set_window_size(config.window_size);
        estimator.set_fidelity_threshold(config.fidelity_threshold);
        config.window_size = estimator.window_size();

        let radius = decay_radius(ctx, config.hop_size, config.time_constant_ms);

        let mut voices = Vec::with_capacity(num_voices);
        for _ in 0..num_voices {
            let mut voice = PitchShift::new(pool, ctx, &estimator)?;
            voice.set_radius(radius);
            voices.push(voice);
        }
        let mut targets = pool.allocate(num_voices)?;
        targets.fill(default_target);
        let outputs = pool.allocate(num_voices)?;

        tracing::debug!(
            voices = num_voices,
            buffer_size = config.buffer_size,
            frame_size = config.frame_size,
            pool_used = pool.used(),
            "voice bank built"
        );

        Ok(Self {
            pool: pool.clone(),
            ctx: *ctx,
            config,
            estimator,
            voices,
            targets,
            outputs,
            radius,
            input_period: 0.0,
        })
    }

    /// Drop every voice and rebuild with `num_voices`, reusing the estimator
    /// (cleared) and the tuning parameters.
    pub(crate) fn rebuild(self, num_voices: usize, default_target: f32) -> Result<Self> {
        let Self {
            pool,
            ctx,
            config,
            mut estimator,
            voices,
            targets,
            outputs,
            ..
        } = self;

        let previous = voices.len();
        drop(voices);
        drop(targets);
        drop(outputs);
        estimator.reset();

        tracing::debug!(from = previous, to = num_voices, "rebuilding voice bank");
        Self::build(&pool, &ctx, num_voices, config, estimator, default_target)
    }

    /// Run every voice once against the estimator, collecting outputs.
    #[inline]
    pub(crate) fn run<F>(&mut self, mut tick: F) -> &[f32]
    where
        F: FnMut(&mut PitchShift, &E, f32) -> f32,
    {
        let estimator = &self.estimator;
        for ((voice, &target), out) in self
            .voices
            .iter_mut()
            .zip(self.targets.iter())
            .zip(self.outputs.iter_mut())
        {
            *out = tick(voice, estimator, target);
        }
        &self.outputs
    }

    #[inline]
    pub(crate) fn estimator_mut(&mut self) -> &mut E {
        &mut self.estimator
    }

    pub(crate) fn estimator(&self) -> &E {
        &self.estimator
    }

    pub(crate) fn check_voice(&self, voice: usize) -> Result<()> {
        if voice < self.voices.len() {
            Ok(())
        } else {
            Err(Error::VoiceOutOfRange {
                voice,
                voices: self.voices.len(),
            })
        }
    }

    pub(crate) fn set_target(&mut self, voice: usize, target: f32) -> Result<()> {
        self.check_voice(voice)?;
        self.targets[voice] = target;
        Ok(())
    }

    pub(crate) fn set_targets(&mut self, target: f32) {
        self.targets.fill(target);
    }

    pub(crate) fn targets(&self) -> &[f32] {
        &self.targets
    }

    pub(crate) fn voices_mut(&mut self) -> &mut [PitchShift] {
        &mut self.voices
    }

    pub(crate) fn voice(&self, voice: usize) -> Option<&PitchShift> {
        self.voices.get(voice)
    }

    pub(crate) fn num_voices(&self) -> usize {
        self.voices.len()
    }

    pub(crate) fn outputs(&self) -> &[f32] {
        &self.outputs
    }

    pub(crate) fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn radius(&self) -> f32 {
        self.radius
    }

    pub(crate) fn set_time_constant(&mut self, time_constant_ms: f32) {
        if !(time_constant_ms > 0.0 && time_constant_ms.is_finite()) {
            tracing::debug!(time_constant_ms, "ignoring non-positive time constant");
            return;
        }
        self.config.time_constant_ms = time_constant_ms;
        self.update_radius();
    }

    pub(crate) fn set_hop_size(&mut self, hop_size: usize) {
        let hop_size = hop_size.max(1);
        self.config.hop_size = hop_size;
        self.estimator.set_hop_size(hop_size);
        self.update_radius();
    }

    pub(crate) fn set_window_size(&mut self, window_size: usize) {
        self.estimator.set_window_size(window_size);
        self.config.window_size = self.estimator.window_size();
        if self.config.window_size != window_size {
            tracing::debug!(
                requested = window_size,
                applied = self.config.window_size,
                "window size clamped"
            );
        }
    }

    pub(crate) fn set_fidelity_threshold(&mut self, threshold: f32) {
        self.estimator.set_fidelity_threshold(threshold);
        if threshold.is_finite() {
            self.config.fidelity_threshold = threshold.clamp(0.0, 1.0);
        }
    }

    /// Input period in seconds.
    pub(crate) fn input_period_secs(&self) -> f32 {
        self.input_period * self.ctx.inv_sample_rate()
    }

    /// Input frequency in Hz, 0 while no period is known.
    pub(crate) fn input_freq(&self) -> f32 {
        if self.input_period > 0.0 {
            self.ctx.sample_rate() / self.input_period
        } else {
            0.0
        }
    }

    pub(crate) fn footprint(&self) -> usize {
        self.voices.iter().map(PitchShift::footprint).sum::<usize>()
            + self.targets.footprint()
            + self.outputs.footprint()
    }

    pub(crate) fn pool(&self) -> &Mempool {
        &self.pool
    }

    fn update_radius(&mut self) {
        self.radius = decay_radius(&self.ctx, self.config.hop_size, self.config.time_constant_ms);
        for voice in &mut self.voices {
            voice.set_radius(self.radius);
        }
    }
}
