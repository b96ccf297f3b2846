//! Core primitives shared by the warble crates.
//!
//! # Primary API
//!
//! - [`Mempool`] / [`PoolBuffer`]: fixed-capacity buffer pool every unit allocates from
//! - [`AudioContext`]: immutable sample-rate context threaded into constructors
//! - [`Highpass`]: one-pole DC/rumble blocker
//! - [`Error`] / [`Result`]
//!
//! All storage is carved out of a [`Mempool`] when a unit is built. After that,
//! processing calls never allocate, block or fail.
//!
//! # Example
//!
//! ```
//! use warble_core::{AudioContext, Highpass, Mempool};
//!
//! let ctx = AudioContext::new(48000.0)?;
//! let pool = Mempool::new(64 * 1024);
//!
//! let mut scratch = pool.allocate(512)?;
//! let mut hp = Highpass::new(&ctx, 40.0);
//! for sample in scratch.iter_mut() {
//!     *sample = hp.tick(1.0);
//! }
//! # Ok::<(), warble_core::Error>(())
//! ```

#![no_std]

#[cfg(any(feature = "std", test))]
extern crate std;

#[macro_use]
extern crate alloc;

/// Compatibility layer for no_std + alloc.
///
/// Re-exports common types that work in both std and no_std environments.
pub mod compat;

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::AudioContext;

mod pool;
pub use pool::{Mempool, PoolBuffer, DEFAULT_POOL_SIZE};

mod filter;
pub use filter::Highpass;
