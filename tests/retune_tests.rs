//! Multi-voice Retune tests
//!
//! Feeds a steady tone through a Retune engine with the default SNAC-based
//! estimator and checks that every voice comes out at its own pitch.
//!
//! Run with:
//! ```bash
//! cargo test -p warble --test retune_tests
//! ```

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::tolerances::*;
use helpers::{
    assert_has_audio, assert_is_silent, assert_period_near, generate_noise, generate_sine,
    init_tracing, measure_period, peak, test_context, TEST_SAMPLE_RATE,
};
use warble::prelude::*;

/// Run `input` through `retune`, collecting each voice's output stream.
fn render<E: PeriodicityEstimator>(retune: &mut Retune<E>, input: &[f32]) -> Vec<Vec<f32>> {
    let mut streams = vec![Vec::with_capacity(input.len()); retune.num_voices()];
    for &x in input {
        for (stream, &y) in streams.iter_mut().zip(retune.tick(x)) {
            stream.push(y);
        }
    }
    streams
}

#[test]
fn test_three_voices_track_their_factors() {
    init_tracing();
    let pool = Mempool::default();
    let ctx = test_context();
    let mut retune = Retune::new(&pool, &ctx, 3, EngineConfig::default()).unwrap();

    let factors = [1.0f32, 1.5, 2.0];
    for (voice, &factor) in factors.iter().enumerate() {
        retune.set_pitch_factor(voice, factor).unwrap();
    }

    // 441 Hz at 44.1 kHz: exactly 100 samples per period
    let input = generate_sine(441.0, TEST_SAMPLE_RATE, 24576);
    let streams = render(&mut retune, &input);

    let input_period = retune.input_period();
    assert_period_near(input_period, 100.0, 0.01, "tracked input period");
    assert!((retune.input_freq() - 441.0).abs() < 5.0);

    for (stream, &factor) in streams.iter().zip(&factors) {
        let steady = &stream[8192..];
        assert_has_audio(steady, 0.3);

        let expected = input_period / factor;
        let min_lag = (expected * 0.7) as usize;
        let max_lag = (expected * 1.4) as usize;
        let period = measure_period(steady, min_lag, max_lag);
        assert_period_near(
            period,
            expected,
            PERIOD_TOLERANCE,
            &format!("voice with factor {}", factor),
        );
    }
}

#[test]
fn test_outputs_silent_before_first_frame() {
    let pool = Mempool::default();
    let mut retune = Retune::new(&pool, &test_context(), 2, EngineConfig::default()).unwrap();
    retune.set_pitch_factors(1.5);

    let input = generate_sine(441.0, TEST_SAMPLE_RATE, 256);
    let streams = render(&mut retune, &input);
    for stream in &streams {
        assert_is_silent(stream, SILENCE_THRESHOLD, "first frame");
    }
}

#[test]
fn test_live_retuning_keeps_running() {
    let pool = Mempool::default();
    let mut retune = Retune::new(&pool, &test_context(), 2, EngineConfig::default()).unwrap();
    retune.set_pitch_factors(1.25);

    let input = generate_sine(330.0, TEST_SAMPLE_RATE, 8192);
    let _ = render(&mut retune, &input[..4096]);

    retune.set_time_constant(50.0);
    retune.set_hop_size(32);
    retune.set_window_size(128);
    retune.set_fidelity_threshold(0.9);

    let streams = render(&mut retune, &input[4096..]);
    for stream in &streams {
        assert!(stream.iter().all(|s| s.is_finite()));
        assert_has_audio(stream, 0.1);
    }
    assert_eq!(retune.config().hop_size, 32);
    assert_eq!(retune.config().window_size, 128);
    assert!((retune.config().fidelity_threshold - 0.9).abs() < DSP_EPSILON);
}

#[test]
fn test_custom_estimator_drives_voices() {
    let pool = Mempool::default();
    let est = ManualPeriod::new(&pool, 1024, 256, 64, 64).unwrap();
    let mut retune =
        Retune::with_estimator(&pool, &test_context(), 1, EngineConfig::default(), est).unwrap();
    retune.estimator_mut().set_period(100.0);
    retune.set_pitch_factor(0, 2.0).unwrap();

    let input = generate_sine(441.0, TEST_SAMPLE_RATE, 16384);
    let streams = render(&mut retune, &input);

    let period = measure_period(&streams[0][4096..], 35, 70);
    assert_period_near(period, 50.0, PERIOD_TOLERANCE, "manual period, factor 2");
    assert_eq!(retune.voice(0).map(|v| v.solad().period()), Some(100.0));
}

#[test]
fn test_noise_input_stays_bounded() {
    let pool = Mempool::default();
    let mut retune = Retune::new(&pool, &test_context(), 2, EngineConfig::default()).unwrap();
    retune.set_pitch_factor(0, 0.5).unwrap();
    retune.set_pitch_factor(1, 3.0).unwrap();

    let input: Vec<f32> = generate_noise(16384, 7).iter().map(|x| 0.5 * x).collect();
    let streams = render(&mut retune, &input);

    for stream in &streams {
        assert!(stream.iter().all(|s| s.is_finite()));
        // Crossfades never exceed the input range; the high-pass may overshoot a little
        assert!(peak(stream) < 2.0, "peak {}", peak(stream));
    }
}
