//! Frame bookkeeping for block-wise analysis of a per-sample stream.

use crate::FrameCursor;
use warble_core::{Error, Mempool, PoolBuffer, Result};

/// Input buffer split into `buffer_size / frame_size` frames.
///
/// Samples are written into the current frame; the read cursor trails exactly
/// one frame behind. When a frame fills up both advance to the next frame.
#[derive(Debug)]
pub struct FrameRing {
    buffer: PoolBuffer,
    frame_size: usize,
    frames_per_buffer: usize,
    cur_block: usize,
    last_block: usize,
    index: usize,
    index_store: usize,
    cursor: FrameCursor,
}

impl FrameRing {
    pub fn new(pool: &Mempool, buffer_size: usize, frame_size: usize) -> Result<Self> {
        if frame_size == 0 || buffer_size % frame_size != 0 || buffer_size / frame_size < 2 {
            return Err(Error::InvalidFrameLayout {
                buffer_size,
                frame_size,
            });
        }

        Ok(Self {
            buffer: pool.allocate(buffer_size)?,
            frame_size,
            frames_per_buffer: buffer_size / frame_size,
            cur_block: 1,
            last_block: 0,
            index: 0,
            index_store: 0,
            cursor: FrameCursor {
                frame_start: frame_size,
                read: 0,
            },
        })
    }

    /// Write one sample. Returns true when it completed a frame.
    #[inline]
    pub fn push(&mut self, sample: f32) -> bool {
        self.cursor = FrameCursor {
            frame_start: self.cur_block * self.frame_size,
            read: self.last_block * self.frame_size + self.index,
        };

        self.buffer[self.cursor.frame_start + self.index] = sample;
        self.index += 1;
        self.index_store = self.index;

        if self.index < self.frame_size {
            return false;
        }

        self.index = 0;
        self.cur_block = (self.cur_block + 1) % self.frames_per_buffer;
        self.last_block = (self.last_block + 1) % self.frames_per_buffer;
        true
    }

    #[inline]
    pub fn frame_ready(&self) -> bool {
        self.index_store >= self.frame_size
    }

    #[inline]
    pub fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    /// The frame the last [`push`](Self::push) wrote into.
    #[inline]
    pub fn frame(&self) -> &[f32] {
        let start = self.cursor.frame_start;
        &self.buffer[start..start + self.frame_size]
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    pub fn frames_per_buffer(&self) -> usize {
        self.frames_per_buffer
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.cur_block = 1;
        self.last_block = 0;
        self.index = 0;
        self.index_store = 0;
        self.cursor = FrameCursor {
            frame_start: self.frame_size,
            read: 0,
        };
    }

    pub fn footprint(&self) -> usize {
        self.buffer.footprint()
    }
}
