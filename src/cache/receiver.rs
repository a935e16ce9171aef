// Receiver-side keyframe cache.

use super::ring::Ring;
use crate::pool::Buffer;

/// Recently received keyframes, looked up by the id a delta frame names.
#[derive(Debug)]
pub struct KeyframeCache {
    ring: Ring<Buffer>,
}

impl KeyframeCache {
    /// # Panics
    ///
    /// Panics if `slots` is zero.
    pub fn new(slots: usize) -> Self {
        Self {
            ring: Ring::new(slots),
        }
    }

    /// Take ownership of `buffer` as keyframe `id`.
    pub fn put(&mut self, id: u16, buffer: Buffer) {
        self.ring.insert(id, buffer);
    }

    /// Shared handle onto keyframe `id`, if it is still cached.
    pub fn get(&self, id: u16) -> Option<Buffer> {
        self.ring.get(id).map(Buffer::add_owner)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
