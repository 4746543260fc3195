//! Keyed deadlines for debounced timers and animation-frame requests.
//!
//! The host drives time: controllers stamp deadlines from event timestamps
//! and fire whatever is due when the host calls `advance(now, ..)`.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    due: Instant,
}

/// At most one deadline per key.
#[derive(Debug)]
pub struct Scheduler<K> {
    entries: Vec<Entry<K>>,
}

impl<K: Copy + Eq> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Cancel any pending deadline for `key` and schedule a new one.
    pub fn debounce(&mut self, key: K, due: Instant) {
        self.cancel(key);
        self.entries.push(Entry { key, due });
    }

    /// Schedule `key` unless it is already pending. Returns true when a new
    /// deadline was added.
    pub fn request(&mut self, key: K, due: Instant) -> bool {
        if self.is_scheduled(key) {
            return false;
        }
        self.entries.push(Entry { key, due });
        true
    }

    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        before != self.entries.len()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_scheduled(&self, key: K) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    pub fn due_at(&self, key: K) -> Option<Instant> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.due)
    }

    /// Earliest pending deadline, for hosts that sleep between events.
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Remove and return every key due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<K> {
        let mut due: Vec<Entry<K>> = Vec::new();
        self.entries.retain(|entry| {
            if entry.due <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Copy + Eq> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
