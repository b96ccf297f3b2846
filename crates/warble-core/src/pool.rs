//! Fixed-capacity buffer pool.
//!
//! Every warble unit takes its sample storage from a [`Mempool`] at construction
//! time. The pool enforces a byte budget so a whole processing graph can be sized
//! up front for a memory-constrained target; once the graph is built nothing
//! allocates again.

use crate::compat::{Arc, AtomicUsize, Box, Ordering};
use crate::{Error, Result};
use core::ops::{Deref, DerefMut};

/// Default pool budget (1 MiB).
pub const DEFAULT_POOL_SIZE: usize = 1024 * 1024;

#[derive(Debug)]
struct PoolInner {
    capacity: usize,
    used: AtomicUsize,
}

/// Shared handle to a fixed byte budget.
///
/// Cloning the handle shares the budget. Buffers hand their bytes back when
/// released or dropped.
#[derive(Debug, Clone)]
pub struct Mempool {
    inner: Arc<PoolInner>,
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Mempool {
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                capacity: capacity_bytes,
                used: AtomicUsize::new(0),
            }),
        }
    }

    /// Allocate a zero-filled buffer of `len` samples.
    pub fn allocate(&self, len: usize) -> Result<PoolBuffer> {
        let bytes = len * core::mem::size_of::<f32>();
        self.reserve(bytes)?;

        Ok(PoolBuffer {
            data: vec![0.0; len].into_boxed_slice(),
            pool: self.clone(),
        })
    }

    /// Return a buffer's bytes to the pool.
    pub fn release(&self, buffer: PoolBuffer) {
        drop(buffer);
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn used(&self) -> usize {
        self.inner.used.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.capacity().saturating_sub(self.used())
    }

    /// Whether two handles share the same budget.
    pub fn same_pool(&self, other: &Mempool) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn reserve(&self, bytes: usize) -> Result<()> {
        let mut used = self.inner.used.load(Ordering::Acquire);
        loop {
            let available = self.inner.capacity.saturating_sub(used);
            if bytes > available {
                tracing::warn!(requested = bytes, available, "mempool exhausted");
                return Err(Error::PoolExhausted {
                    requested: bytes,
                    available,
                });
            }
            match self.inner.used.compare_exchange_weak(
                used,
                used + bytes,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(current) => used = current,
            }
        }
    }

    fn give_back(&self, bytes: usize) {
        self.inner.used.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// Sample buffer owned by a unit and accounted against its [`Mempool`].
#[derive(Debug)]
pub struct PoolBuffer {
    data: Box<[f32]>,
    pool: Mempool,
}

impl PoolBuffer {
    /// Bytes this buffer holds against its pool.
    #[inline]
    pub fn footprint(&self) -> usize {
        self.data.len() * core::mem::size_of::<f32>()
    }

    /// The pool this buffer was carved from.
    pub fn pool(&self) -> &Mempool {
        &self.pool
    }
}

impl Deref for PoolBuffer {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        &self.data
    }
}

impl DerefMut for PoolBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

impl Drop for PoolBuffer {
    fn drop(&mut self) {
        self.pool.give_back(self.footprint());
    }
}
