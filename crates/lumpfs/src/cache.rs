//! Per-container lump cache
//!
//! One slot per entry, allocated on first use. A cached lump is an
//! `Arc<[u8]>`, so callers keep a stable buffer even if the slot is released
//! afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lifetime of a cached lump.
///
/// Tags are ordered: purging up to a tag releases that tag and every
/// shorter-lived one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CacheTag {
    /// Free to release at any time
    Purgable,
    /// Released when the current map ends
    Map,
    /// Released when the game session ends
    Game,
    /// Kept for the lifetime of the container
    #[default]
    Static,
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Purgable => "purgable",
            Self::Map => "map",
            Self::Game => "game",
            Self::Static => "static",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
struct CachedLump {
    data: Arc<[u8]>,
    tag: CacheTag,
}

/// Cache slots for the entries of one container
#[derive(Debug, Clone, Default)]
pub struct LumpCache {
    slot_count: usize,
    slots: Option<Vec<Option<CachedLump>>>,
    cached: usize,
}

impl LumpCache {
    /// Create an unallocated cache for `slot_count` entries
    pub fn new(slot_count: usize) -> Self {
        Self {
            slot_count,
            slots: None,
            cached: 0,
        }
    }

    /// Number of slots
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Check if the slot table has been allocated
    pub fn is_allocated(&self) -> bool {
        self.slots.is_some()
    }

    /// Cached data for a slot
    pub fn get(&self, index: usize) -> Option<Arc<[u8]>> {
        self.slot(index).map(|lump| Arc::clone(&lump.data))
    }

    /// Tag of a cached slot
    pub fn tag(&self, index: usize) -> Option<CacheTag> {
        self.slot(index).map(|lump| lump.tag)
    }

    /// Check if a slot holds data
    pub fn contains(&self, index: usize) -> bool {
        self.slot(index).is_some()
    }

    /// Store data in a slot, replacing anything already there.
    ///
    /// Returns the shared buffer now held by the slot, or `None` when the
    /// index is out of range.
    pub fn insert(&mut self, index: usize, data: Vec<u8>, tag: CacheTag) -> Option<Arc<[u8]>> {
        if index >= self.slot_count {
            return None;
        }

        let slot_count = self.slot_count;
        let slots = self.slots.get_or_insert_with(|| vec![None; slot_count]);
        let data: Arc<[u8]> = Arc::from(data);
        let previous = slots[index].replace(CachedLump {
            data: Arc::clone(&data),
            tag,
        });

        if previous.is_none() {
            self.cached += 1;
        }
        Some(data)
    }

    /// Change the tag of a cached slot; no-op if the slot is empty
    pub fn change_tag(&mut self, index: usize, tag: CacheTag) -> bool {
        match self.slot_mut(index) {
            Some(lump) => {
                lump.tag = tag;
                true
            }
            None => false,
        }
    }

    /// Release one slot
    pub fn remove(&mut self, index: usize) -> bool {
        let removed = self
            .slots
            .as_mut()
            .and_then(|slots| slots.get_mut(index))
            .and_then(Option::take)
            .is_some();

        if removed {
            self.cached -= 1;
        }
        removed
    }

    /// Release every slot and the slot table itself
    pub fn clear(&mut self) -> usize {
        let released = self.cached;
        self.slots = None;
        self.cached = 0;
        released
    }

    /// Release every slot whose tag is `up_to` or shorter-lived
    pub fn purge(&mut self, up_to: CacheTag) -> usize {
        let Some(slots) = self.slots.as_mut() else {
            return 0;
        };

        let mut released = 0;
        for slot in slots.iter_mut() {
            if slot.as_ref().is_some_and(|lump| lump.tag <= up_to) {
                *slot = None;
                released += 1;
            }
        }

        self.cached -= released;
        released
    }

    /// Number of cached slots
    pub fn len(&self) -> usize {
        self.cached
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cached == 0
    }

    /// Bytes held by cached slots
    pub fn memory_usage(&self) -> usize {
        self.slots.as_ref().map_or(0, |slots| {
            slots.iter().flatten().map(|lump| lump.data.len()).sum()
        })
    }

    fn slot(&self, index: usize) -> Option<&CachedLump> {
        self.slots.as_ref()?.get(index)?.as_ref()
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut CachedLump> {
        self.slots.as_mut()?.get_mut(index)?.as_mut()
    }
}
