//! Used-Key Registry Module
//!
//! Keyed stores cannot list their contents, so backends that live on one
//! record every key they write here. `destroy_all` sweeps this set.

use std::collections::BTreeSet;

use parking_lot::Mutex;

// == Key Registry ==
/// Set of prefixed keys written through one backend type.
///
/// The registry is a superset of the live keys written through it: it may
/// hold keys whose records already expired, but never misses a live one.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    keys: Mutex<BTreeSet<String>>,
}

impl KeyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a key. Adding a known key is a no-op.
    pub fn add(&self, key: &str) {
        self.keys.lock().insert(key.to_string());
    }

    /// Forgets a key only if `is_gone` confirms it while the registry is
    /// locked, so a concurrent write cannot be dropped between the check and
    /// the removal.
    pub fn remove_if(&self, key: &str, is_gone: impl FnOnce() -> bool) -> bool {
        let mut keys = self.keys.lock();
        if keys.contains(key) && is_gone() {
            keys.remove(key)
        } else {
            false
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.lock().contains(key)
    }

    /// Copy of the current keys, in sorted order.
    pub fn snapshot(&self) -> Vec<String> {
        self.keys.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.keys.lock().clear();
    }
}
