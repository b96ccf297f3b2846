//! # Warble - Real-time Pitch Shifting
//!
//! Time-domain pitch shifting and pitch correction for embedded and real-time
//! audio, built from small `no_std` subsystems.
//!
//! ## Architecture
//!
//! Warble is an umbrella crate that re-exports:
//! - **warble-core** - Buffer pool, audio context, errors, one-pole high-pass
//! - **warble-analysis** - Periodicity estimation (SNAC period, power envelope, frame clock)
//! - **warble-dsp** - SOLAD engine, pitch-shift voice, Retune and Autotune
//!
//! ## Quick Start
//!
//! ```
//! use warble::prelude::*;
//!
//! let pool = Mempool::default();
//! let ctx = AudioContext::new(44100.0)?;
//!
//! // Three voices: unison, a fifth up, an octave up
//! let mut retune = Retune::new(&pool, &ctx, 3, EngineConfig::default())?;
//! retune.set_pitch_factor(1, 1.5)?;
//! retune.set_pitch_factor(2, 2.0)?;
//!
//! for n in 0..2048 {
//!     let input = (n as f32 * 0.0628).sin();
//!     let voices = retune.tick(input);
//!     let _mix: f32 = voices.iter().sum();
//! }
//! # Ok::<(), warble::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default) - forwards `std` to the member crates, which build as `no_std` + `alloc` without it
//! - `serde` - `Serialize`/`Deserialize` for configuration types

/// Re-export of warble-core for direct access
pub use warble_core as core;

/// Re-export of warble-analysis
pub use warble_analysis as analysis;

/// Re-export of warble-dsp
pub use warble_dsp as dsp;

pub use warble_core::{AudioContext, Error, Highpass, Mempool, PoolBuffer, Result};

pub use warble_analysis::{
    DetectionConfig, FrameCursor, FrameRing, ManualPeriod, PeriodDetection, PeriodicityEstimator,
    PowerEnvelope, Snac,
};

pub use warble_dsp::{
    Autotune, CrossfadeScheduler, DelayRing, EngineConfig, PitchShift, Retune, Solad, LOOP_SIZE,
};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{
        Autotune, AudioContext, DetectionConfig, EngineConfig, Error, ManualPeriod, Mempool,
        PeriodDetection, PeriodicityEstimator, PitchShift, Result, Retune, Solad,
    };
}
