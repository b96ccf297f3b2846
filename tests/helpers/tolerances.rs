//! Tolerance constants for pitch-shift testing.
//!
//! Shifted signals carry crossfade splices, so period measurements are
//! compared relatively rather than sample-exactly.

/// Floating point rounding errors (unity-factor delay, exact reads).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// DSP processing tolerance.
pub const DSP_EPSILON: f32 = 1e-4;

/// Relative error allowed on a measured output period.
pub const PERIOD_TOLERANCE: f32 = 0.03;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;
