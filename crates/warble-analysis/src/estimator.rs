//! The estimator contract consumed by pitch-shift voices.

/// Buffer offsets for the current tick.
///
/// `frame_start` is the first sample of the frame being written; `read` is the
/// slot one frame behind it, from which voices emit their delayed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameCursor {
    pub frame_start: usize,
    pub read: usize,
}

/// Periodicity estimator shared by the voices of a multi-voice engine.
///
/// The engine that owns the estimator calls [`tick`](Self::tick) once per input
/// sample; voices only read from it.
pub trait PeriodicityEstimator {
    /// Feed one sample. Returns the raw period estimate in samples (0 until a
    /// period has been found).
    fn tick(&mut self, sample: f32) -> f32;

    /// Current period in samples.
    fn period(&self) -> f32;

    /// Signal energy on a 0-100 dB scale (full-scale sine ≈ 97).
    fn envelope(&self) -> f32;

    fn frame_size(&self) -> usize;

    fn buffer_size(&self) -> usize;

    fn window_size(&self) -> usize;

    /// True on the tick that completed a frame.
    fn frame_ready(&self) -> bool;

    fn cursor(&self) -> FrameCursor;

    /// The most recently written frame of input.
    fn input_frame(&self) -> &[f32];

    fn set_hop_size(&mut self, hop_size: usize);

    fn set_window_size(&mut self, window_size: usize);

    fn set_fidelity_threshold(&mut self, threshold: f32);

    /// Period smoothing coefficient. Estimators without smoothing ignore it.
    fn set_alpha(&mut self, _alpha: f32) {}

    /// Relative jump beyond which smoothing is bypassed.
    fn set_tolerance(&mut self, _tolerance: f32) {}

    /// Clear all signal state, keeping configuration.
    fn reset(&mut self);
}
