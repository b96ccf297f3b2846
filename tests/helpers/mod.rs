//! Test helpers and fixtures for warble integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (unity-factor delay)
//! - `PERIOD_TOLERANCE` (3%): Measured output periods of shifted signals
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use warble::prelude::*;

/// Default test sample rate
pub const TEST_SAMPLE_RATE: f32 = 44100.0;

/// Block size used by the block-level SOLAD tests
pub const TEST_BLOCK_SIZE: usize = 256;

/// Install a tracing subscriber that writes through the test harness.
/// Safe to call from every test; only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_context() -> AudioContext {
    AudioContext::new(TEST_SAMPLE_RATE).expect("valid test sample rate")
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (2.0 * std::f64::consts::PI * frequency as f64 * t).sin() as f32
        })
        .collect()
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 4.0 - 1.0
        })
        .collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Estimate the fundamental period of `samples` by autocorrelation.
///
/// Searches lags in `min_lag..=max_lag` and returns the one with the highest
/// normalized correlation, refined by parabolic interpolation. Robust against
/// the crossfade splices a pitch shifter leaves in its output.
pub fn measure_period(samples: &[f32], min_lag: usize, max_lag: usize) -> f32 {
    assert!(max_lag < samples.len() / 2, "signal too short for lag {}", max_lag);

    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    let x: Vec<f32> = samples.iter().map(|s| s - mean).collect();

    let corr = |lag: usize| -> f32 {
        let n = x.len() - lag;
        let mut acf = 0.0f64;
        let mut norm = 0.0f64;
        for i in 0..n {
            acf += (x[i] * x[i + lag]) as f64;
            norm += (x[i] * x[i] + x[i + lag] * x[i + lag]) as f64;
        }
        if norm > 0.0 {
            (2.0 * acf / norm) as f32
        } else {
            0.0
        }
    };

    let (best, _) = (min_lag..=max_lag)
        .map(|lag| (lag, corr(lag)))
        .fold((min_lag, f32::MIN), |acc, (lag, c)| if c > acc.1 { (lag, c) } else { acc });

    if best == min_lag || best == max_lag {
        return best as f32;
    }

    let a = corr(best - 1);
    let b = corr(best);
    let c = corr(best + 1);
    let denom = a - 2.0 * b + c;
    if denom.abs() < 1e-12 {
        best as f32
    } else {
        best as f32 + 0.5 * (a - c) / denom
    }
}

/// Assert that a measured period is within `tolerance` (relative) of `expected`.
pub fn assert_period_near(measured: f32, expected: f32, tolerance: f32, context: &str) {
    let err = (measured - expected).abs() / expected;
    assert!(
        err <= tolerance,
        "{}: expected period {:.2}, measured {:.2} ({:.1}% off)",
        context,
        expected,
        measured,
        err * 100.0
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Assert signal is silent within threshold.
pub fn assert_is_silent(samples: &[f32], threshold: f32, context: &str) {
    let max_val = peak(samples);
    assert!(
        max_val <= threshold,
        "{}: Expected silence (threshold {}), but peak was {}",
        context,
        threshold,
        max_val
    );
}
