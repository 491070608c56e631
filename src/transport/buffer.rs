//! Fixed-size transmit buffer pool
//!
//! The pool hands out a bounded number of buffers. A [`TransmitBuffer`]
//! returns its slot when dropped, so every path that lets go of a buffer
//! (send, explicit free, unwinding) releases it exactly once.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::BytesMut;

use crate::error::{Error, Result};

struct PoolInner {
    buffer_size: usize,
    capacity: usize,
    available: AtomicUsize,
    allocated: AtomicU64,
    released: AtomicU64,
}

/// Pool statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers handed out since creation
    pub allocated: u64,
    /// Buffers returned since creation
    pub released: u64,
    /// Buffers currently held by callers
    pub in_use: usize,
}

/// Bounded pool of transmit buffers
///
/// Cloning yields another handle to the same pool.
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    /// Create a pool of `capacity` buffers, each holding up to `buffer_size` bytes
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                buffer_size,
                capacity,
                available: AtomicUsize::new(capacity),
                allocated: AtomicU64::new(0),
                released: AtomicU64::new(0),
            }),
        }
    }

    /// Take a buffer able to hold `size` bytes
    ///
    /// Returns `None` if the pool is exhausted or `size` exceeds the
    /// per-buffer capacity.
    pub fn get(&self, size: usize) -> Option<TransmitBuffer> {
        if size > self.inner.buffer_size {
            return None;
        }

        self.inner
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()?;
        self.inner.allocated.fetch_add(1, Ordering::Relaxed);

        Some(TransmitBuffer {
            data: BytesMut::with_capacity(size),
            capacity: size,
            pool: Arc::clone(&self.inner),
        })
    }

    /// Number of free buffers
    pub fn available(&self) -> usize {
        self.inner.available.load(Ordering::Acquire)
    }

    /// Total number of buffers
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Per-buffer capacity in bytes
    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size
    }

    /// Get pool statistics
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.inner.allocated.load(Ordering::Relaxed),
            released: self.inner.released.load(Ordering::Relaxed),
            in_use: self.inner.capacity - self.available(),
        }
    }
}

/// One pooled buffer staging an outgoing packet
pub struct TransmitBuffer {
    data: BytesMut,
    capacity: usize,
    pool: Arc<PoolInner>,
}

impl TransmitBuffer {
    /// Copy `payload` into the buffer and set its length to match
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.capacity {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                capacity: self.capacity,
            });
        }

        self.data.clear();
        self.data.extend_from_slice(payload);
        Ok(())
    }

    /// Buffer contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Logical length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size this buffer was requested with
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for TransmitBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmitBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Drop for TransmitBuffer {
    fn drop(&mut self) {
        self.pool.available.fetch_add(1, Ordering::AcqRel);
        self.pool.released.fetch_add(1, Ordering::Relaxed);
    }
}
