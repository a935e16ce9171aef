// Sender-side keyframe cache, ranked by caller confidence.

use super::ring::Ring;
use crate::error::{Error, Result};
use crate::pool::Buffer;

#[derive(Debug)]
struct Ranked {
    confidence: u8,
    buffer: Buffer,
}

/// Cached keyframe chosen as a delta reference.
#[derive(Debug)]
pub struct Reference {
    pub id: u16,
    pub confidence: u8,
    /// Shared handle; the cache keeps its own until eviction.
    pub buffer: Buffer,
}

/// Recently sent keyframes with the confidence they were sent with.
#[derive(Debug)]
pub struct ConfidenceCache {
    ring: Ring<Ranked>,
}

impl ConfidenceCache {
    /// # Panics
    ///
    /// Panics if `slots` is zero.
    pub fn new(slots: usize) -> Self {
        Self {
            ring: Ring::new(slots),
        }
    }

    /// Take ownership of `buffer` as keyframe `id`.
    pub fn put(&mut self, id: u16, confidence: u8, buffer: Buffer) {
        self.ring.insert(id, Ranked { confidence, buffer });
    }

    /// Highest-confidence keyframe among the last `lookback` insertions.
    ///
    /// Ties go to the newer keyframe. Returns `None` when none of those
    /// insertions is still cached.
    pub fn most_confident(&self, lookback: usize) -> Result<Option<Reference>> {
        if lookback == 0 {
            return Err(Error::Configuration(
                "confidence lookback must be at least 1".into(),
            ));
        }

        let mut best: Option<(u16, &Ranked)> = None;
        for (id, entry) in self.ring.recent(lookback) {
            if best.is_none_or(|(_, held)| entry.confidence > held.confidence) {
                best = Some((id, entry));
            }
        }

        Ok(best.map(|(id, entry)| Reference {
            id,
            confidence: entry.confidence,
            buffer: entry.buffer.add_owner(),
        }))
    }

    pub fn contains(&self, id: u16) -> bool {
        self.ring.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}
