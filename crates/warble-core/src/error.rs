//! Error types for warble.

use crate::compat::String;
use thiserror::Error;

/// Error type for construction and reconfiguration.
///
/// Processing calls never return errors; they degrade to the last valid state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Pool exhausted: requested {requested} bytes, {available} available")]
    PoolExhausted { requested: usize, available: usize },

    #[error("Invalid frame layout: buffer_size={buffer_size}, frame_size={frame_size}")]
    InvalidFrameLayout {
        buffer_size: usize,
        frame_size: usize,
    },

    #[error("Invalid voice count: {0}. Must be at least 1")]
    InvalidVoiceCount(usize),

    #[error("Voice {voice} out of range (engine has {voices} voices)")]
    VoiceOutOfRange { voice: usize, voices: usize },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
