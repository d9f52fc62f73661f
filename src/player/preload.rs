//! Bookkeeping for preloaded handles.
//!
//! The cache never talks to the engine itself: every method that drops an
//! entry hands the handle back so the controller can unload it exactly once.

use std::collections::VecDeque;

use crate::audio::HandleId;
use crate::library::TrackId;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct PreloadEntry {
    pub track: TrackId,
    pub handle: HandleId,
    pub ready: bool,
}

pub(super) struct PreloadCache {
    // Oldest first; eviction pops from the front.
    entries: VecDeque<PreloadEntry>,
    capacity: usize,
}

impl PreloadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, track: &TrackId) -> bool {
        self.entries.iter().any(|e| &e.track == track)
    }

    /// Add an entry, returning handles evicted to stay within capacity.
    pub fn insert(&mut self, track: TrackId, handle: HandleId, ready: bool) -> Vec<HandleId> {
        let mut evicted = Vec::new();
        if !self.is_enabled() {
            evicted.push(handle);
            return evicted;
        }
        while self.entries.len() >= self.capacity {
            match self.entries.pop_front() {
                Some(old) => evicted.push(old.handle),
                None => break,
            }
        }
        self.entries.push_back(PreloadEntry {
            track,
            handle,
            ready,
        });
        evicted
    }

    /// Flag the entry for `handle` as playable. Returns false for unknown handles.
    pub fn mark_ready(&mut self, handle: HandleId) -> bool {
        match self.entries.iter_mut().find(|e| e.handle == handle) {
            Some(entry) => {
                entry.ready = true;
                true
            }
            None => false,
        }
    }

    /// Remove and return the entry for `track`, transferring ownership of its handle.
    pub fn take(&mut self, track: &TrackId) -> Option<PreloadEntry> {
        let pos = self.entries.iter().position(|e| &e.track == track)?;
        self.entries.remove(pos)
    }

    pub fn remove_handle(&mut self, handle: HandleId) -> Option<PreloadEntry> {
        let pos = self.entries.iter().position(|e| e.handle == handle)?;
        self.entries.remove(pos)
    }

    /// Empty the cache, returning every handle it held.
    pub fn drain(&mut self) -> Vec<HandleId> {
        self.entries.drain(..).map(|e| e.handle).collect()
    }
}
