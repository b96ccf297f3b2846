//! Period tracking with the specially normalized autocorrelation (SNAC).
//!
//! ## Algorithm
//!
//! For a window `x[0..W)` and lag `τ`:
//!
//! ```text
//!            2 · Σ x[n]·x[n+τ]
//! r(τ) = ─────────────────────────
//!         Σ (x[n]² + x[n+τ]²)
//! ```
//!
//! `r(τ)` is bounded to `[-1, 1]` and reaches 1 at lags where the window repeats
//! exactly. After the lobe around lag 0, each positive lobe contributes one peak;
//! the first peak reaching [`PEAK_RATIO`] of the highest one is the period, and
//! its height is the fidelity.
//!
//! Analysis runs every `W / overlap` samples. The lag sum is computed directly,
//! O(W²/2) per analysis.

use warble_core::{Error, Mempool, PoolBuffer, Result};

/// Default analysis window in samples.
pub const DEFAULT_WINDOW: usize = 1024;

/// A lobe peak is accepted once it reaches this fraction of the highest peak.
pub const PEAK_RATIO: f32 = 0.9;

/// Windows quieter than this RMS report zero fidelity.
pub const DEFAULT_MIN_RMS: f32 = 0.003;

const MAX_PEAKS: usize = 32;

#[derive(Debug)]
pub struct Snac {
    input: PoolBuffer,
    scratch: PoolBuffer,
    nsdf: PoolBuffer,
    write: usize,
    since_analysis: usize,
    overlap: usize,
    min_rms: f32,
    period: f32,
    fidelity: f32,
}

impl Snac {
    pub fn new(pool: &Mempool, window: usize, overlap: usize) -> Result<Self> {
        if window < 16 {
            return Err(Error::InvalidConfig(format!(
                "snac window {} too small (minimum 16)",
                window
            )));
        }

        Ok(Self {
            input: pool.allocate(window)?,
            scratch: pool.allocate(window)?,
            nsdf: pool.allocate(window / 2)?,
            write: 0,
            since_analysis: 0,
            overlap: overlap.clamp(1, window),
            min_rms: DEFAULT_MIN_RMS,
            period: 0.0,
            fidelity: 0.0,
        })
    }

    /// Feed a block. Returns true if an analysis ran during it.
    pub fn process_block(&mut self, block: &[f32]) -> bool {
        let window = self.input.len();
        let interval = window / self.overlap;
        let mut analyzed = false;

        for &sample in block {
            self.input[self.write] = sample;
            self.write = (self.write + 1) % window;
            self.since_analysis += 1;

            if self.since_analysis >= interval {
                self.since_analysis = 0;
                self.analyze();
                analyzed = true;
            }
        }
        analyzed
    }

    /// Most recent period in samples (0 until one has been found).
    #[inline]
    pub fn period(&self) -> f32 {
        self.period
    }

    /// Height of the chosen peak, 0..=1. Zero for silent or aperiodic windows.
    #[inline]
    pub fn fidelity(&self) -> f32 {
        self.fidelity
    }

    pub fn window(&self) -> usize {
        self.input.len()
    }

    pub fn set_overlap(&mut self, overlap: usize) {
        self.overlap = overlap.clamp(1, self.input.len());
    }

    pub fn set_min_rms(&mut self, min_rms: f32) {
        if min_rms.is_finite() {
            self.min_rms = min_rms.max(0.0);
        }
    }

    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.write = 0;
        self.since_analysis = 0;
        self.period = 0.0;
        self.fidelity = 0.0;
    }

    pub fn footprint(&self) -> usize {
        self.input.footprint() + self.scratch.footprint() + self.nsdf.footprint()
    }

    fn analyze(&mut self) {
        let window = self.input.len();

        // Unroll the ring oldest-first
        for n in 0..window {
            self.scratch[n] = self.input[(self.write + n) % window];
        }

        let energy: f32 = self.scratch.iter().map(|x| x * x).sum();
        if libm::sqrtf(energy / window as f32) < self.min_rms {
            self.fidelity = 0.0;
            return;
        }

        self.compute_nsdf();

        match self.pick_peak() {
            Some((period, fidelity)) => {
                self.period = period;
                self.fidelity = fidelity.min(1.0);
            }
            None => self.fidelity = 0.0,
        }
    }

    fn compute_nsdf(&mut self) {
        let window = self.scratch.len();
        let x = &self.scratch[..];

        for (tau, out) in self.nsdf.iter_mut().enumerate() {
            let mut acf = 0.0f32;
            let mut norm = 0.0f32;
            for n in 0..window - tau {
                let a = x[n];
                let b = x[n + tau];
                acf += a * b;
                norm += a * a + b * b;
            }
            *out = if norm > 0.0 { 2.0 * acf / norm } else { 0.0 };
        }
    }

    /// Returns the interpolated `(lag, height)` of the chosen lobe peak.
    fn pick_peak(&self) -> Option<(f32, f32)> {
        let nsdf = &self.nsdf[..];
        let max_lag = nsdf.len();

        let mut peaks = [(0usize, 0.0f32); MAX_PEAKS];
        let mut count = 0;

        // Skip the lobe around lag 0
        let mut tau = 1;
        while tau < max_lag && nsdf[tau] > 0.0 {
            tau += 1;
        }

        while tau < max_lag && count < MAX_PEAKS {
            while tau < max_lag && nsdf[tau] <= 0.0 {
                tau += 1;
            }
            if tau >= max_lag {
                break;
            }

            let mut peak = tau;
            while tau < max_lag && nsdf[tau] > 0.0 {
                if nsdf[tau] > nsdf[peak] {
                    peak = tau;
                }
                tau += 1;
            }
            peaks[count] = (peak, nsdf[peak]);
            count += 1;
        }

        let peaks = &peaks[..count];
        let highest = peaks.iter().map(|&(_, v)| v).fold(0.0f32, f32::max);
        if highest <= 0.0 {
            return None;
        }

        let threshold = PEAK_RATIO * highest;
        let &(lag, _) = peaks.iter().find(|&&(_, v)| v >= threshold)?;

        Some(self.parabolic_interpolation(lag))
    }

    fn parabolic_interpolation(&self, lag: usize) -> (f32, f32) {
        let nsdf = &self.nsdf[..];
        if lag == 0 || lag + 1 >= nsdf.len() {
            return (lag as f32, nsdf[lag]);
        }

        let a = nsdf[lag - 1];
        let b = nsdf[lag];
        let c = nsdf[lag + 1];
        let denom = a - 2.0 * b + c;
        if libm::fabsf(denom) < 1e-12 {
            return (lag as f32, b);
        }

        let delta = 0.5 * (a - c) / denom;
        (lag as f32 + delta, b - 0.25 * (a - c) * delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::TAU;

    fn sine_block(period: f32, start: usize, len: usize) -> alloc::vec::Vec<f32> {
        (start..start + len)
            .map(|i| 0.8 * libm::sinf(TAU * i as f32 / period))
            .collect()
    }

    fn snac() -> Snac {
        Snac::new(&Mempool::default(), DEFAULT_WINDOW, 1).unwrap()
    }

    #[test]
    fn test_rejects_tiny_window() {
        assert!(Snac::new(&Mempool::default(), 8, 1).is_err());
    }

    #[test]
    fn test_detects_integer_period() {
        let mut snac = snac();
        assert!(snac.process_block(&sine_block(100.0, 0, 1024)));

        assert!(
            libm::fabsf(snac.period() - 100.0) < 0.5,
            "period {}",
            snac.period()
        );
        assert!(snac.fidelity() > 0.95, "fidelity {}", snac.fidelity());
    }

    #[test]
    fn test_detects_fractional_period() {
        let mut snac = snac();
        let period = 44100.0 / 220.0;
        snac.process_block(&sine_block(period, 0, 2048));

        assert!(
            libm::fabsf(snac.period() - period) < 1.0,
            "expected {}, got {}",
            period,
            snac.period()
        );
    }

    #[test]
    fn test_prefers_fundamental_over_octave() {
        let mut snac = snac();
        let block: alloc::vec::Vec<f32> = (0..1024)
            .map(|i| {
                let t = i as f32;
                0.5 * libm::sinf(TAU * t / 160.0) + 0.4 * libm::sinf(TAU * t / 80.0)
            })
            .collect();
        snac.process_block(&block);

        assert!(
            libm::fabsf(snac.period() - 160.0) < 1.0,
            "period {}",
            snac.period()
        );
    }

    #[test]
    fn test_silence_has_no_fidelity() {
        let mut snac = snac();
        snac.process_block(&[0.0; 1024]);
        assert_eq!(snac.fidelity(), 0.0);
        assert_eq!(snac.period(), 0.0);
    }

    #[test]
    fn test_analysis_cadence_follows_overlap() {
        let mut snac = Snac::new(&Mempool::default(), 256, 4).unwrap();
        let mut analyses = 0;
        for start in (0..1024).step_by(16) {
            if snac.process_block(&sine_block(32.0, start, 16)) {
                analyses += 1;
            }
        }
        assert_eq!(analyses, 16);
    }
}
