//! # Listener registry - event name to ordered listener handles.
//!
//! The registry is the bus's only shared mutable state. Every read and write goes
//! through one [`parking_lot::Mutex`], held just long enough to mutate or copy a sequence.
//!
//! ## Architecture
//! ```text
//! register(L)    ──► lock ──► map[L.event_name].push(L)
//! unregister(L)  ──► lock ──► map[L.event_name].retain(id != L.id) ──► drop key if empty
//! clear(name)    ──► lock ──► map.remove(name)
//! snapshot(name) ──► lock ──► map[name].clone()   (dispatch iterates the copy, unlocked)
//! ```
//!
//! ## Rules
//! - A key present in the map always holds a non-empty sequence.
//! - Insertion order is preserved; duplicates are allowed.
//! - Removal matches [`ListenerId`](crate::ListenerId), never handler equality.
//! - The lock is never held while a handler runs.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::listeners::Listener;

/// Thread-safe mapping from event name to registered listeners.
#[derive(Default)]
pub(crate) struct Registry {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to its event name's sequence; returns the new sequence length.
    pub(crate) fn register(&self, listener: Listener) -> usize {
        let mut map = self.listeners.lock();
        let seq = map.entry(listener.event_name().to_owned()).or_default();
        seq.push(listener);
        seq.len()
    }

    /// Removes every entry with `listener`'s identity; returns how many were removed.
    pub(crate) fn unregister(&self, listener: &Listener) -> usize {
        let mut map = self.listeners.lock();
        let Some(seq) = map.get_mut(listener.event_name()) else {
            return 0;
        };

        let before = seq.len();
        seq.retain(|l| l.id() != listener.id());
        let removed = before - seq.len();

        if seq.is_empty() {
            map.remove(listener.event_name());
        }
        removed
    }

    /// Drops the whole sequence for `event_name`; returns how many listeners it held.
    pub(crate) fn clear(&self, event_name: &str) -> usize {
        self.listeners
            .lock()
            .remove(event_name)
            .map_or(0, |seq| seq.len())
    }

    /// Number of listeners for `event_name` (0 if absent).
    pub(crate) fn count(&self, event_name: &str) -> usize {
        self.listeners.lock().get(event_name).map_or(0, Vec::len)
    }

    /// Names currently holding at least one listener, in unspecified order.
    pub(crate) fn names(&self) -> Vec<String> {
        self.listeners.lock().keys().cloned().collect()
    }

    /// True if no event name holds a listener.
    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }

    /// Copy of the listener sequence for `event_name`, taken under the lock.
    pub(crate) fn snapshot(&self, event_name: &str) -> Vec<Listener> {
        self.listeners
            .lock()
            .get(event_name)
            .cloned()
            .unwrap_or_default()
    }
}
