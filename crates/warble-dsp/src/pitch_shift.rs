//! Single pitch-shift voice driven by a shared periodicity estimator.

use crate::config::decay_radius;
use crate::Solad;
use warble_analysis::PeriodicityEstimator;
use warble_core::{AudioContext, Highpass, Mempool, PoolBuffer, Result};

/// Output high-pass cutoff in Hz.
pub const HIGHPASS_HZ: f32 = 40.0;

/// Frames to suppress re-triggering after an attack.
const ATTACK_HOLDOFF: u32 = 5;
/// Initial holdoff so the first frames of a fresh voice never count as an attack.
const INITIAL_HOLDOFF: u32 = 20;

/// Envelope level (dB scale) below which attack tracking pauses.
const ATTACK_FLOOR: f32 = 1.0;
const ATTACK_MIN_LEVEL: f32 = 60.0;
const ATTACK_MIN_RISE: f32 = 6.0;

#[derive(Debug, Clone, Copy)]
struct AttackDetector {
    max: f32,
    last_max: f32,
    delta_max: f32,
    holdoff: u32,
}

impl AttackDetector {
    fn new() -> Self {
        Self {
            max: 0.0,
            last_max: 0.0,
            delta_max: 0.0,
            holdoff: INITIAL_HOLDOFF,
        }
    }

    /// Called once per frame with the estimator's envelope.
    fn detect(&mut self, envelope: f32, radius: f32) -> bool {
        if envelope >= ATTACK_FLOOR {
            self.last_max = self.max;
            if envelope > self.max {
                self.max = envelope;
            } else {
                self.max *= radius;
            }
            self.delta_max = self.max - self.last_max;
        }

        self.holdoff = self.holdoff.saturating_sub(1);

        if self.holdoff == 0 && self.max > ATTACK_MIN_LEVEL && self.delta_max > ATTACK_MIN_RISE {
            self.holdoff = ATTACK_HOLDOFF;
            true
        } else {
            false
        }
    }
}

/// One SOLAD engine plus output buffering, high-pass and attack detection.
///
/// The voice never owns its estimator: every tick borrows it from the caller,
/// which must have fed it the current input sample already. Output lags the
/// input by one frame; the frame currently being filled is never read back in
/// the same tick.
///
/// ```
/// use warble_analysis::{ManualPeriod, PeriodicityEstimator};
/// use warble_core::{AudioContext, Mempool};
/// use warble_dsp::PitchShift;
///
/// let pool = Mempool::default();
/// let ctx = AudioContext::default();
/// let mut est = ManualPeriod::new(&pool, 1024, 256, 64, 64)?;
/// est.set_period(100.0);
///
/// let mut voice = PitchShift::new(&pool, &ctx, &est)?;
/// voice.set_pitch_factor(1.5);
/// for n in 0..4096 {
///     est.tick((n as f32 * 0.0628).sin());
///     let _out = voice.shift(&est);
/// }
/// # Ok::<(), warble_core::Error>(())
/// ```
#[derive(Debug)]
pub struct PitchShift {
    solad: Solad,
    hp: Highpass,
    out_buffer: PoolBuffer,
    frame_size: usize,
    pitch_factor: f32,
    inv_sample_rate: f32,
    radius: f32,
    attack: AttackDetector,
}

impl PitchShift {
    /// Build a voice sized for `estimator`'s buffer and frame layout.
    pub fn new<E: PeriodicityEstimator>(
        pool: &Mempool,
        ctx: &AudioContext,
        estimator: &E,
    ) -> Result<Self> {
        let mut solad = Solad::new(pool)?;
        solad.set_pitch_factor(1.0);

        Ok(Self {
            solad,
            hp: Highpass::new(ctx, HIGHPASS_HZ),
            out_buffer: pool.allocate(estimator.buffer_size())?,
            frame_size: estimator.frame_size(),
            pitch_factor: 1.0,
            inv_sample_rate: ctx.inv_sample_rate(),
            radius: decay_radius(ctx, 64, 100.0),
            attack: AttackDetector::new(),
        })
    }

    /// Tick with the fixed pitch factor.
    pub fn shift<E: PeriodicityEstimator>(&mut self, estimator: &E) -> f32 {
        let factor = self.pitch_factor;
        self.tick(estimator, estimator.period(), |_| factor)
    }

    /// Tick, shifting the tracked pitch to `freq` Hz. Unity while no period is known.
    pub fn shift_to_freq<E: PeriodicityEstimator>(&mut self, estimator: &E, freq: f32) -> f32 {
        self.shift_to_freq_with_period(estimator, estimator.period(), freq)
    }

    /// Tick with the factor `period / target(period)`, where `target` maps
    /// the tracked period to the desired one (both in samples).
    pub fn shift_to_func<E, F>(&mut self, estimator: &E, mut target: F) -> f32
    where
        E: PeriodicityEstimator,
        F: FnMut(f32) -> f32,
    {
        self.tick(estimator, estimator.period(), |period| period / target(period))
    }

    /// Tick with an explicit period and factor.
    pub(crate) fn shift_with_period<E: PeriodicityEstimator>(
        &mut self,
        estimator: &E,
        period: f32,
        factor: f32,
    ) -> f32 {
        self.tick(estimator, period, |_| factor)
    }

    /// As [`shift_to_freq`](Self::shift_to_freq) with a period screened by the caller.
    pub(crate) fn shift_to_freq_with_period<E: PeriodicityEstimator>(
        &mut self,
        estimator: &E,
        period: f32,
        freq: f32,
    ) -> f32 {
        let inv_sr = self.inv_sample_rate;
        self.tick(estimator, period, |period| {
            if period != 0.0 {
                period * freq * inv_sr
            } else {
                1.0
            }
        })
    }

    fn tick<E, F>(&mut self, estimator: &E, period: f32, factor: F) -> f32
    where
        E: PeriodicityEstimator,
        F: FnOnce(f32) -> f32,
    {
        let cursor = estimator.cursor();
        let out = self.hp.tick(self.out_buffer[cursor.read]);

        if estimator.frame_ready() {
            if self.attack.detect(estimator.envelope(), self.radius) {
                self.solad.set_read_lag(estimator.window_size() as f32);
            }

            self.solad.set_period(period);
            self.pitch_factor = factor(period);
            self.solad.set_pitch_factor(self.pitch_factor);

            let start = cursor.frame_start;
            let frame = estimator.input_frame();
            let n = frame.len().min(self.frame_size);
            self.solad
                .io_samples(&frame[..n], &mut self.out_buffer[start..start + n]);
        }

        out
    }

    pub fn set_pitch_factor(&mut self, pitch_factor: f32) {
        self.pitch_factor = pitch_factor;
    }

    /// Last factor set or derived. May be out of range; the SOLAD engine
    /// ignores factors it cannot use.
    pub fn pitch_factor(&self) -> f32 {
        self.pitch_factor
    }

    /// Per-hop decay of the attack detector's running maximum.
    pub fn set_radius(&mut self, radius: f32) {
        if radius.is_finite() {
            self.radius = radius.clamp(0.0, 1.0);
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn solad(&self) -> &Solad {
        &self.solad
    }

    /// Clear audio state: ring, output buffer, filter and attack tracking.
    pub fn reset(&mut self) {
        self.solad.reset_state();
        self.hp.reset();
        self.out_buffer.fill(0.0);
        self.attack = AttackDetector::new();
    }

    pub fn footprint(&self) -> usize {
        self.solad.footprint() + self.out_buffer.footprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warble_analysis::ManualPeriod;

    fn setup() -> (Mempool, AudioContext, ManualPeriod) {
        let pool = Mempool::default();
        let ctx = AudioContext::default();
        let est = ManualPeriod::new(&pool, 1024, 256, 64, 64).unwrap();
        (pool, ctx, est)
    }

    #[test]
    fn test_attack_fires_on_sharp_rise_only() {
        let mut det = AttackDetector::new();
        det.holdoff = 0;
        let radius = 0.98;

        assert!(!det.detect(50.0, radius));
        // Above the level threshold and rising by more than 6 dB
        assert!(det.detect(80.0, radius));
        // Holdoff suppresses an immediate re-trigger
        assert!(!det.detect(95.0, radius));
    }

    #[test]
    fn test_attack_ignores_quiet_envelope() {
        let mut det = AttackDetector::new();
        det.holdoff = 0;
        assert!(!det.detect(0.5, 0.9));
        assert_eq!(det.max, 0.0);
    }

    #[test]
    fn test_running_max_decays() {
        let mut det = AttackDetector::new();
        det.detect(70.0, 0.5);
        det.detect(10.0, 0.5);
        assert_eq!(det.max, 35.0);
        assert_eq!(det.delta_max, -35.0);
    }

    #[test]
    fn test_attack_snaps_read_lag_to_window() {
        let pool = Mempool::default();
        let ctx = AudioContext::default();
        let mut est = ManualPeriod::new(&pool, 1024, 256, 32, 64).unwrap();
        est.set_period(100.0);
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();

        // Long enough for the initial holdoff to run out
        for _ in 0..8192 {
            est.tick(0.0);
            voice.shift(&est);
        }
        assert_eq!(voice.solad().read_lag(), 64.0);

        for n in 0..512 {
            est.tick(libm::sinf(core::f32::consts::TAU * n as f32 / 100.0));
            voice.shift(&est);
        }
        assert_eq!(voice.solad().read_lag(), 32.0);
    }

    #[test]
    fn test_output_lags_one_frame() {
        let (pool, ctx, mut est) = setup();
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();
        est.set_period(64.0);

        // First frame: nothing has been processed yet
        for _ in 0..256 {
            est.tick(1.0);
            assert_eq!(voice.shift(&est), 0.0);
        }
        // Second frame reads what SOLAD produced from the first
        let mut heard = false;
        for _ in 0..256 {
            est.tick(1.0);
            if voice.shift(&est) != 0.0 {
                heard = true;
            }
        }
        assert!(heard);
    }

    #[test]
    fn test_shift_to_freq_derives_factor() {
        let (pool, ctx, mut est) = setup();
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();

        for _ in 0..256 {
            est.tick(0.0);
            voice.shift_to_freq(&est, 440.0);
        }
        // No period yet: unity
        assert_eq!(voice.pitch_factor(), 1.0);

        est.set_period(200.0);
        for _ in 0..256 {
            est.tick(0.0);
            voice.shift_to_freq(&est, 441.0);
        }
        approx::assert_relative_eq!(voice.pitch_factor(), 2.0, epsilon = 1e-4);
        approx::assert_relative_eq!(voice.solad().pitch_factor(), 2.0, epsilon = 1e-4);
        assert_eq!(voice.solad().period(), 200.0);
    }

    #[test]
    fn test_shift_to_func_maps_period() {
        let (pool, ctx, mut est) = setup();
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();
        est.set_period(120.0);

        for _ in 0..256 {
            est.tick(0.0);
            voice.shift_to_func(&est, |p| p * 2.0);
        }
        assert_eq!(voice.pitch_factor(), 0.5);
        assert_eq!(voice.solad().pitch_factor(), 0.5);
    }

    #[test]
    fn test_invalid_factor_keeps_engine_factor() {
        let (pool, ctx, mut est) = setup();
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();
        est.set_period(100.0);
        voice.set_pitch_factor(1.5);
        for _ in 0..256 {
            est.tick(0.0);
            voice.shift(&est);
        }
        voice.set_pitch_factor(-1.0);
        for _ in 0..256 {
            est.tick(0.0);
            voice.shift(&est);
        }
        assert_eq!(voice.solad().pitch_factor(), 1.5);
    }

    #[test]
    fn test_reset_silences_output() {
        let (pool, ctx, mut est) = setup();
        let mut voice = PitchShift::new(&pool, &ctx, &est).unwrap();
        est.set_period(100.0);
        for _ in 0..1024 {
            est.tick(0.7);
            voice.shift(&est);
        }
        voice.reset();
        est.reset();
        est.tick(0.0);
        assert_eq!(voice.shift(&est), 0.0);
    }
}
