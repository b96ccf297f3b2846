//! Block-level SOLAD tests
//!
//! Drives `Solad` directly with a locked period, the way a caller with its own
//! pitch tracking would, and checks the shifted output's periodicity.
//!
//! Run with:
//! ```bash
//! cargo test -p warble --test solad_tests
//! ```

#[path = "helpers/mod.rs"]
mod helpers;

use helpers::tolerances::*;
use helpers::{
    assert_has_audio, assert_period_near, generate_sine, init_tracing, measure_period, peak,
    TEST_BLOCK_SIZE, TEST_SAMPLE_RATE,
};
use warble::prelude::*;

/// Run `input` through a SOLAD engine block by block.
fn process(solad: &mut Solad, input: &[f32]) -> Vec<f32> {
    let mut output = vec![0.0; input.len()];
    for (inp, out) in input
        .chunks(TEST_BLOCK_SIZE)
        .zip(output.chunks_mut(TEST_BLOCK_SIZE))
    {
        solad.io_samples(inp, out);
    }
    output
}

fn locked_engine(period: f32, pitch_factor: f32) -> Solad {
    let mut solad = Solad::new(&Mempool::default()).expect("pool large enough");
    solad.set_period(period);
    solad.set_pitch_factor(pitch_factor);
    solad
}

#[test]
fn test_octave_up_halves_period() {
    init_tracing();
    let input = generate_sine(220.0, TEST_SAMPLE_RATE, 16384);
    let mut solad = locked_engine(200.0, 2.0);

    let output = process(&mut solad, &input);
    // Skip the settle: the first blocks read from an empty ring
    let steady = &output[4096..];

    assert_has_audio(steady, 0.5);
    let period = measure_period(steady, 70, 140);
    let expected = TEST_SAMPLE_RATE / 220.0 / 2.0;
    assert_period_near(period, expected, PERIOD_TOLERANCE, "pitch factor 2.0");
}

#[test]
fn test_octave_down_doubles_period() {
    let input = generate_sine(220.0, TEST_SAMPLE_RATE, 16384);
    let mut solad = locked_engine(200.0, 0.5);

    let output = process(&mut solad, &input);
    let steady = &output[4096..];

    assert_has_audio(steady, 0.5);
    let period = measure_period(steady, 300, 500);
    let expected = TEST_SAMPLE_RATE / 220.0 * 2.0;
    assert_period_near(period, expected, PERIOD_TOLERANCE, "pitch factor 0.5");
}

#[test]
fn test_unity_factor_reproduces_delayed_input() {
    let input = generate_sine(441.0, TEST_SAMPLE_RATE, 8192);
    let mut solad = locked_engine(100.0, 1.0);

    let output = process(&mut solad, &input);
    let lag = solad.read_lag() as usize;
    assert_eq!(lag, 64);

    for n in lag..output.len() {
        assert!(
            (output[n] - input[n - lag]).abs() <= FLOAT_EPSILON,
            "sample {}: {} vs {}",
            n,
            output[n],
            input[n - lag]
        );
    }
}

#[test]
fn test_output_bounded_across_factor_sweep() {
    let input = generate_sine(300.0, TEST_SAMPLE_RATE, 8192);
    let period = TEST_SAMPLE_RATE / 300.0;

    for &factor in &[0.25f32, 0.4, 0.5, 0.8, 1.0, 1.2, 1.5, 2.5, 4.0] {
        let mut solad = locked_engine(period, factor);
        let output = process(&mut solad, &input);
        assert!(output.iter().all(|s| s.is_finite()), "factor {}", factor);
        assert!(peak(&output) <= 1.0 + DSP_EPSILON, "factor {}", factor);
    }
}

#[test]
fn test_factor_change_mid_stream_stays_continuous() {
    let input = generate_sine(220.0, TEST_SAMPLE_RATE, 16384);
    let mut solad = locked_engine(200.0, 0.75);

    let mut output = vec![0.0; input.len()];
    for (i, (inp, out)) in input
        .chunks(TEST_BLOCK_SIZE)
        .zip(output.chunks_mut(TEST_BLOCK_SIZE))
        .enumerate()
    {
        if i == 32 {
            solad.set_pitch_factor(1.5);
        }
        solad.io_samples(inp, out);
    }

    // A splice-free sine of this frequency never moves more than ~0.03 per
    // sample; crossfaded jumps may add a little, hard cuts would add a lot
    let max_step = output[1024..]
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0f32, f32::max);
    assert!(max_step < 0.25, "discontinuity of {}", max_step);
}
