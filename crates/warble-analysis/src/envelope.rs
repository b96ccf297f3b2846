//! Windowed power envelope on a 0-100 dB scale.

use core::f32::consts::TAU;
use warble_core::{Mempool, PoolBuffer, Result};

/// Smallest usable analysis window.
const MIN_WINDOW: usize = 4;

/// Hann-weighted mean-square power over the last `window_size` samples,
/// recomputed every `hop_size` samples.
///
/// Output is `100 + 10·log10(power)` floored at zero, so 100 corresponds to a
/// mean square of 1 and a full-scale sine reads about 97. Attack detection
/// thresholds in the pitch shifter are expressed on this scale.
#[derive(Debug)]
pub struct PowerEnvelope {
    history: PoolBuffer,
    weights: PoolBuffer,
    write: usize,
    window_size: usize,
    hop_size: usize,
    counter: usize,
    value: f32,
}

impl PowerEnvelope {
    /// `capacity` bounds every later [`set_window_size`](Self::set_window_size).
    pub fn new(
        pool: &Mempool,
        capacity: usize,
        window_size: usize,
        hop_size: usize,
    ) -> Result<Self> {
        let capacity = capacity.max(MIN_WINDOW);
        let mut env = Self {
            history: pool.allocate(capacity)?,
            weights: pool.allocate(capacity)?,
            write: 0,
            window_size: 0,
            hop_size: hop_size.max(1),
            counter: 0,
            value: 0.0,
        };
        env.set_window_size(window_size);
        Ok(env)
    }

    #[inline]
    pub fn process_sample(&mut self, sample: f32) {
        let capacity = self.history.len();
        self.history[self.write] = sample;
        self.write = (self.write + 1) % capacity;

        self.counter += 1;
        if self.counter >= self.hop_size {
            self.counter = 0;
            self.value = power_to_db(self.windowed_power());
        }
    }

    pub fn process_block(&mut self, block: &[f32]) {
        for &sample in block {
            self.process_sample(sample);
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    pub fn capacity(&self) -> usize {
        self.history.len()
    }

    /// Clamped to `[4, capacity]`. Returns the size actually applied.
    pub fn set_window_size(&mut self, window_size: usize) -> usize {
        let clamped = window_size.clamp(MIN_WINDOW, self.history.len());
        if clamped != window_size {
            tracing::debug!(requested = window_size, applied = clamped, "envelope window clamped");
        }

        self.window_size = clamped;
        let norm = 1.0 / clamped as f32;
        for (i, w) in self.weights[..clamped].iter_mut().enumerate() {
            *w = (1.0 - libm::cosf(TAU * i as f32 / clamped as f32)) * norm;
        }
        clamped
    }

    pub fn set_hop_size(&mut self, hop_size: usize) {
        self.hop_size = hop_size.max(1);
        self.counter = self.counter.min(self.hop_size - 1);
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.write = 0;
        self.counter = 0;
        self.value = 0.0;
    }

    pub fn footprint(&self) -> usize {
        self.history.footprint() + self.weights.footprint()
    }

    fn windowed_power(&self) -> f32 {
        let capacity = self.history.len();
        let start = self.write + capacity - self.window_size;
        self.weights[..self.window_size]
            .iter()
            .enumerate()
            .map(|(k, &w)| {
                let x = self.history[(start + k) % capacity];
                w * x * x
            })
            .sum()
    }
}

/// Power to the 0-100 dB envelope scale.
#[inline]
pub(crate) fn power_to_db(power: f32) -> f32 {
    if power <= 0.0 {
        return 0.0;
    }
    (100.0 + 10.0 * libm::log10f(power)).max(0.0)
}
