//! Reusable record buffers
//!
//! Every enabled event borrows one `Buffer` from a `BufferPool` and hands it
//! back when the record is written or abandoned. The free list is a bounded
//! crossbeam channel, so acquire and release never take a lock and never
//! block: an empty pool allocates, a full pool drops the returned buffer.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};

/// Initial capacity of freshly allocated buffers
pub const DEFAULT_BUFFER_CAPACITY: usize = 500;

/// Maximum number of idle buffers kept by a default pool
pub const DEFAULT_MAX_POOLED: usize = 1024;

/// Byte buffer owned by exactly one event at a time.
///
/// Releasing consumes the handle, so a buffer cannot be released twice or
/// touched after release.
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Buffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.0.len())
            .field("capacity", &self.0.capacity())
            .finish()
    }
}

/// Lock-free pool of record buffers
///
/// # Example
///
/// ```
/// use rust_event_logger::core::BufferPool;
///
/// let pool = BufferPool::new();
/// let mut buf = pool.acquire();
/// buf.extend_from_slice(b"{}");
/// pool.release(buf);
///
/// let buf = pool.acquire();
/// assert!(buf.is_empty());
/// assert_eq!(pool.allocated(), 1);
/// ```
pub struct BufferPool {
    free_tx: Sender<Vec<u8>>,
    free_rx: Receiver<Vec<u8>>,
    buffer_capacity: usize,
    acquired: AtomicU64,
    released: AtomicU64,
    allocated: AtomicU64,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_POOLED, DEFAULT_BUFFER_CAPACITY)
    }

    /// Pool keeping at most `max_pooled` idle buffers, each allocated with
    /// `buffer_capacity` bytes. `max_pooled` of zero disables reuse.
    pub fn with_capacity(max_pooled: usize, buffer_capacity: usize) -> Self {
        let (free_tx, free_rx) = bounded(max_pooled);
        Self {
            free_tx,
            free_rx,
            buffer_capacity,
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
        }
    }

    /// Take an empty buffer, reusing a pooled one when available
    pub fn acquire(&self) -> Buffer {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        match self.free_rx.try_recv() {
            Ok(buf) => Buffer(buf),
            Err(_) => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Buffer(Vec::with_capacity(self.buffer_capacity))
            }
        }
    }

    /// Return a buffer. Its capacity is kept; it is dropped if the pool is full.
    pub fn release(&self, buf: Buffer) {
        self.released.fetch_add(1, Ordering::Relaxed);
        let mut inner = buf.0;
        inner.clear();
        let _ = self.free_tx.try_send(inner);
    }

    /// Buffers handed out so far
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::Relaxed)
    }

    /// Buffers returned so far
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Buffers created because the pool was empty
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Idle buffers currently waiting for reuse
    pub fn pooled(&self) -> usize {
        self.free_rx.len()
    }

    /// Buffers acquired and not yet released
    pub fn outstanding(&self) -> u64 {
        self.acquired().saturating_sub(self.released())
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("acquired", &self.acquired())
            .field("released", &self.released())
            .field("allocated", &self.allocated())
            .field("pooled", &self.pooled())
            .finish()
    }
}
