//! Time-domain pitch shifting (SOLAD) and the multi-voice engines built on it.
//!
//! # Layers
//!
//! - [`DelayRing`]: 4096-sample circular store with interpolated reads
//! - [`CrossfadeScheduler`]: read-pointer jump and crossfade state machine
//! - [`Solad`]: block-wise pitch shifter over one ring
//! - [`PitchShift`]: one voice, fed by a shared [`PeriodicityEstimator`]
//! - [`Retune`] / [`Autotune`]: N voices around one estimator
//!
//! Every unit draws its buffers from a [`Mempool`](warble_core::Mempool) when
//! built. Per-sample and per-block calls never allocate and never fail.
//!
//! # Example
//!
//! ```
//! use warble_core::{AudioContext, Mempool};
//! use warble_dsp::{Autotune, EngineConfig};
//!
//! let pool = Mempool::default();
//! let ctx = AudioContext::default();
//! let mut autotune = Autotune::new(&pool, &ctx, 1, EngineConfig::default())?;
//! autotune.set_freq(0, 440.0)?;
//!
//! for n in 0..1024 {
//!     let input = (n as f32 * 0.05).sin();
//!     let corrected = autotune.tick(input)[0];
//!     assert!(corrected.is_finite());
//! }
//! # Ok::<(), warble_core::Error>(())
//! ```
//!
//! [`PeriodicityEstimator`]: warble_analysis::PeriodicityEstimator

#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

#[macro_use]
extern crate alloc;

mod delay_ring;
pub use delay_ring::{DelayRing, LOOP_MASK, LOOP_SIZE};

mod crossfade;
pub use crossfade::{CrossfadeScheduler, INIT_PERIOD, MIN_PERIOD, XFADE_IDLE};

mod solad;
pub use solad::{Solad, MAX_BLOCK};

mod pitch_shift;
pub use pitch_shift::{PitchShift, HIGHPASS_HZ};

mod config;
pub use config::{decay_radius, EngineConfig};

mod bank;

mod retune;
pub use retune::Retune;

mod autotune;
pub use autotune::{Autotune, UNVOICED_PERIOD};
