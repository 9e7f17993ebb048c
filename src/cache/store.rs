//! Key/Value Store Module
//!
//! The capability trait shared-memory and remote stores expose, and the
//! process-wide in-memory store behind the memory backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cache::entry::{current_timestamp_ms, StoreEntry};

// == Store Operations ==
/// The primitives a keyed backend needs from its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    Fetch,
    Exists,
    Delete,
}

impl StoreOp {
    /// Every primitive, in the order they are probed.
    pub const ALL: [StoreOp; 4] = [StoreOp::Store, StoreOp::Fetch, StoreOp::Exists, StoreOp::Delete];

    pub fn name(self) -> &'static str {
        match self {
            StoreOp::Store => "store",
            StoreOp::Fetch => "fetch",
            StoreOp::Exists => "exists",
            StoreOp::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// == Store Error ==
/// Failure reported by a store primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store refused the operation
    #[error("rejected by store: {0}")]
    Rejected(String),

    /// The store could not be reached
    #[error("store unreachable: {0}")]
    Unreachable(String),
}

// == Key/Value Store Trait ==
/// A shared key/value store with store-native expiration and no key listing.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Stores `value` under `key`; `ttl` of `None` means no expiry.
    fn store(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<(), StoreError>;

    /// Fetches a live value.
    fn fetch(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Whether a live value exists under `key`.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Deletes `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Whether the store provides the given primitive.
    fn supports(&self, _op: StoreOp) -> bool {
        true
    }
}

// == Shared Memory Store ==
/// In-process key/value store with TTL, shared by every memory backend in
/// the process through [`SharedMemoryStore::global`].
///
/// Expired entries are invisible to reads immediately and physically
/// removed by [`SharedMemoryStore::purge_expired`].
#[derive(Debug, Default)]
pub struct SharedMemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl SharedMemoryStore {
    // == Constructor ==
    /// Creates a new, private store. Mostly useful for tests.
    pub fn new() -> Self {
        Self::default()
    }

    // == Global ==
    /// Returns the process-wide store.
    pub fn global() -> Arc<SharedMemoryStore> {
        static GLOBAL: OnceLock<Arc<SharedMemoryStore>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(SharedMemoryStore::new())).clone()
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, "purged expired shared store entries");
        }
        removed
    }

    // == Length ==
    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn live(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }
}

impl KeyValueStore for SharedMemoryStore {
    fn store(&self, key: &str, value: Value, ttl: Option<u64>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::Rejected("empty key".to_string()));
        }
        self.entries
            .write()
            .insert(key.to_string(), StoreEntry::new(value, ttl));
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.live(key))
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self
            .entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired()))
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
