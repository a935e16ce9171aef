// Pool of fixed-capacity, reference-counted byte buffers.
//
// A `Buffer` is an owning handle onto pooled bytes. `add_owner` hands out one
// more handle to the same bytes; every handle is released exactly once, either
// through `release` or on drop. When the owner count reaches zero the bytes
// are cleared and pushed back onto the pool's free list.
//
// The free list is mutex-guarded so one pool can serve many streams on many
// threads. Mutating a buffer requires being its sole owner.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};

/// Abort on a buffer-ownership defect in calling code.
///
/// Logged first so the cause survives a `panic = "abort"` build.
#[cold]
pub(crate) fn resource_misuse(what: &str) -> ! {
    log::error!("resource misuse: {what}");
    panic!("resource misuse: {what}");
}

// ---------------------------------------------------------------------------
// BufferPool
// ---------------------------------------------------------------------------

struct PoolShared {
    capacity: usize,
    free: Mutex<Vec<Vec<u8>>>,
    in_use: AtomicUsize,
}

impl PoolShared {
    fn reclaim(&self, mut bytes: Vec<u8>) {
        bytes.clear();
        self.in_use.fetch_sub(1, Ordering::AcqRel);
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(bytes);
    }
}

/// Shared source of [`Buffer`]s with one fixed capacity.
///
/// Cloning the pool is cheap; clones hand out and reclaim buffers from the
/// same free list.
#[derive(Clone)]
pub struct BufferPool {
    shared: Arc<PoolShared>,
}

impl BufferPool {
    /// Create an empty pool whose buffers hold at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                capacity,
                free: Mutex::new(Vec::new()),
                in_use: AtomicUsize::new(0),
            }),
        }
    }

    /// Fixed capacity of every buffer from this pool.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Take a buffer with one owner and logical length equal to capacity.
    ///
    /// Recycled buffers come back zero-filled.
    pub fn acquire(&self) -> Buffer {
        let recycled = self
            .shared
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let mut bytes = recycled.unwrap_or_else(|| Vec::with_capacity(self.shared.capacity));
        bytes.resize(self.shared.capacity, 0);
        self.shared.in_use.fetch_add(1, Ordering::AcqRel);

        Buffer {
            slot: Arc::new(Slot {
                bytes,
                owners: AtomicUsize::new(1),
                pool: Arc::clone(&self.shared),
            }),
        }
    }

    /// Buffers sitting on the free list.
    pub fn idle(&self) -> usize {
        self.shared
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Buffers handed out and not yet returned.
    pub fn in_use(&self) -> usize {
        self.shared.in_use.load(Ordering::Acquire)
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &self.capacity())
            .field("in_use", &self.in_use())
            .field("idle", &self.idle())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

struct Slot {
    bytes: Vec<u8>,
    owners: AtomicUsize,
    pool: Arc<PoolShared>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.pool.reclaim(std::mem::take(&mut self.bytes));
    }
}

/// Owning handle onto a pooled byte buffer.
///
/// The same bytes may be held by several handles at once (for example a cache
/// slot and an in-flight caller); they go back to the pool only when every
/// handle has been released.
pub struct Buffer {
    slot: Arc<Slot>,
}

impl Buffer {
    /// Register one more owner and return its handle.
    pub fn add_owner(&self) -> Buffer {
        self.slot.owners.fetch_add(1, Ordering::AcqRel);
        Buffer {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Give up this handle's ownership. Same as dropping it.
    pub fn release(self) {
        drop(self);
    }

    /// Number of live handles onto these bytes.
    pub fn owners(&self) -> usize {
        self.slot.owners.load(Ordering::Acquire)
    }

    /// Logical length.
    #[inline]
    pub fn len(&self) -> usize {
        self.slot.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot.bytes.is_empty()
    }

    /// Fixed maximum length.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slot.pool.capacity
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.slot.bytes
    }

    /// Mutable view of the logical bytes. Aborts if the buffer is shared.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.exclusive().as_mut_slice()
    }

    /// Set the logical length, zero-filling any growth.
    pub fn resize(&mut self, length: usize) -> Result<()> {
        let capacity = self.capacity();
        if length > capacity {
            return Err(Error::InvalidLength { length, capacity });
        }
        self.exclusive().resize(length, 0);
        Ok(())
    }

    /// Replace the contents with `data`.
    pub fn copy_from_slice(&mut self, data: &[u8]) -> Result<()> {
        self.resize(data.len())?;
        self.as_mut_slice().copy_from_slice(data);
        Ok(())
    }

    /// Backing vector for codecs that append output. Callers must keep the
    /// length within `capacity()`.
    pub(crate) fn bytes_mut(&mut self) -> &mut Vec<u8> {
        self.exclusive()
    }

    fn exclusive(&mut self) -> &mut Vec<u8> {
        match Arc::get_mut(&mut self.slot) {
            Some(slot) => &mut slot.bytes,
            None => resource_misuse("buffer mutated while shared with another owner"),
        }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.slot.owners.fetch_sub(1, Ordering::AcqRel) == 0 {
            resource_misuse("buffer released more times than it was acquired");
        }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("owners", &self.owners())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
