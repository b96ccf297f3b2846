//! Periodicity estimation for the warble pitch shifters.
//!
//! The pitch shifters only need three things from an estimator: the period of
//! the input in samples, an energy envelope for attack detection, and a frame
//! clock telling them when a fresh block of input is ready. That contract is the
//! [`PeriodicityEstimator`] trait.
//!
//! - [`PeriodDetection`]: default estimator (SNAC period + power envelope)
//! - [`ManualPeriod`]: estimator whose period is supplied by the caller
//! - [`FrameRing`]: frame bookkeeping shared by both
//! - [`Snac`] / [`PowerEnvelope`]: the analysis stages

#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

#[macro_use]
extern crate alloc;

mod estimator;
pub use estimator::{FrameCursor, PeriodicityEstimator};

mod frame_ring;
pub use frame_ring::FrameRing;

mod envelope;
pub use envelope::PowerEnvelope;

mod snac;
pub use snac::Snac;

mod detection;
pub use detection::{DetectionConfig, PeriodDetection};

mod manual;
pub use manual::ManualPeriod;
