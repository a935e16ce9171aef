// Fixed-slot eviction ring with an id index.
//
// The ring remembers the ids of the N most recent insertions in a fixed array
// with a modulo write cursor. Entries themselves live in the index, so lookup
// by id is O(1). Inserting into an occupied slot evicts its entry first; the
// evicted entry is dropped, which releases any buffer it holds.

use std::collections::HashMap;

/// Ring of `slots` ids plus the entries they name.
#[derive(Debug)]
pub struct Ring<E> {
    slots: Box<[Option<u16>]>,
    /// Slot of the most recent insertion.
    cursor: usize,
    entries: HashMap<u16, E>,
}

impl<E> Ring<E> {
    /// # Panics
    ///
    /// Panics if `slots` is zero.
    pub fn new(slots: usize) -> Self {
        assert!(slots > 0, "ring needs at least one slot");
        Self {
            slots: vec![None; slots].into_boxed_slice(),
            cursor: 0,
            entries: HashMap::with_capacity(slots),
        }
    }

    /// Advance the cursor and store `entry` under `id`, evicting whatever the
    /// next slot held.
    ///
    /// Re-inserting an id that is still cached replaces its entry and frees
    /// the older slot, so eviction never removes the newer entry.
    pub fn insert(&mut self, id: u16, entry: E) {
        self.cursor = (self.cursor + 1) % self.slots.len();

        if let Some(old) = self.slots[self.cursor].take() {
            if self.entries.remove(&old).is_some() {
                log::debug!("cache evicted frame {old}");
            }
        }

        if self.entries.insert(id, entry).is_some() {
            for slot in self.slots.iter_mut().filter(|slot| **slot == Some(id)) {
                *slot = None;
            }
        }
        self.slots[self.cursor] = Some(id);
    }

    pub fn get(&self, id: u16) -> Option<&E> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.entries.contains_key(&id)
    }

    /// Entries from the last `lookback` insertions, newest first.
    ///
    /// Slots whose id has since been evicted or replaced are skipped, so fewer
    /// than `lookback` entries may come back. `lookback` is clamped to the
    /// slot count.
    pub fn recent(&self, lookback: usize) -> impl Iterator<Item = (u16, &E)> + '_ {
        let n = self.slots.len();
        (0..lookback.min(n))
            .filter_map(move |back| self.slots[(self.cursor + n - back) % n])
            .filter_map(move |id| self.entries.get(&id).map(|entry| (id, entry)))
    }

    /// Live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixed number of slots.
    pub fn slots(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<E>(ring: &Ring<E>, lookback: usize) -> Vec<u16> {
        ring.recent(lookback).map(|(id, _)| id).collect()
    }

    #[test]
    fn recent_walks_newest_first() {
        let mut ring = Ring::new(4);
        for id in 1..=3u16 {
            ring.insert(id, ());
        }
        assert_eq!(ids(&ring, 2), [3, 2]);
        assert_eq!(ids(&ring, 4), [3, 2, 1]);
        assert_eq!(ids(&ring, 100), [3, 2, 1]);
    }

    #[test]
    fn oldest_slot_is_overwritten() {
        let mut ring = Ring::new(3);
        for id in 10..14u16 {
            ring.insert(id, id);
        }
        assert!(!ring.contains(10));
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.get(13), Some(&13));
        assert_eq!(ids(&ring, 3), [13, 12, 11]);
    }

    #[test]
    fn single_slot_ring_keeps_latest() {
        let mut ring = Ring::new(1);
        ring.insert(7, "a");
        ring.insert(8, "b");
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get(8), Some(&"b"));
        assert_eq!(ids(&ring, 1), [8]);
    }

    #[test]
    fn reinserted_id_survives_eviction_of_its_old_slot() {
        let mut ring = Ring::new(3);
        ring.insert(1, "old");
        ring.insert(2, "x");
        ring.insert(1, "new");
        // Next insertion lands on the slot that first held id 1.
        ring.insert(3, "y");
        assert_eq!(ring.get(1), Some(&"new"));
        assert_eq!(ids(&ring, 3), [3, 1, 2]);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn id_zero_is_an_ordinary_id() {
        let mut ring = Ring::new(2);
        ring.insert(0, ());
        ring.insert(5, ());
        assert!(ring.contains(0));
        ring.insert(6, ());
        assert!(!ring.contains(0));
        assert!(ring.contains(5));
    }
}
