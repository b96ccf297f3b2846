//! Circular sample store with a guard slot for branch-free interpolation.

use warble_core::{Mempool, PoolBuffer, Result};

/// Ring capacity in samples. Must be a power of two.
pub const LOOP_SIZE: usize = 4096;
pub const LOOP_MASK: usize = LOOP_SIZE - 1;

/// `LOOP_SIZE` samples plus one guard slot.
///
/// The guard slot (index `LOOP_SIZE`) mirrors index 0 after every write, so an
/// interpolated read at `LOOP_SIZE - 1 + frac` sees the wrapped neighbour
/// without a second mask.
#[derive(Debug)]
pub struct DelayRing {
    buf: PoolBuffer,
    time_index: usize,
    block_start: usize,
}

impl DelayRing {
    pub fn new(pool: &Mempool) -> Result<Self> {
        Ok(Self {
            buf: pool.allocate(LOOP_SIZE + 1)?,
            time_index: 0,
            block_start: 0,
        })
    }

    /// Append a block at the write cursor, wrapping as needed, then advance
    /// the cursor by the block length.
    pub fn write(&mut self, block: &[f32]) {
        self.block_start = self.time_index;
        for (j, &sample) in block.iter().enumerate() {
            self.buf[(self.block_start + j) & LOOP_MASK] = sample;
        }
        self.buf[LOOP_SIZE] = self.buf[0];
        self.time_index = (self.block_start + block.len()) & LOOP_MASK;
    }

    /// Linear interpolation between `floor(index)` and its successor, index
    /// taken modulo `LOOP_SIZE`. Exact at integer indices.
    #[inline]
    pub fn read_interpolated(&self, index: f32) -> f32 {
        if !index.is_finite() {
            return 0.0;
        }

        let whole = libm::floorf(index);
        let frac = index - whole;
        let i = (whole as i64 & LOOP_MASK as i64) as usize;

        let a = self.buf[i];
        let b = self.buf[i + 1];
        a + frac * (b - a)
    }

    /// Ring position of the first sample of the last written block, offset by
    /// one loop so that subtracting a lag never goes negative.
    #[inline]
    pub fn reference_index(&self) -> f32 {
        (self.block_start + LOOP_SIZE) as f32
    }

    #[inline]
    pub fn time_index(&self) -> usize {
        self.time_index
    }

    /// Sample at an integer ring position.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.buf[index & LOOP_MASK]
    }

    /// Zero every slot and rewind the cursor.
    pub fn clear(&mut self) {
        self.buf.fill(0.0);
        self.time_index = 0;
        self.block_start = 0;
    }

    pub fn footprint(&self) -> usize {
        self.buf.footprint()
    }
}
