//! Memory Backend Module
//!
//! Stores records in the process-wide [`SharedMemoryStore`] (or any other
//! [`KeyValueStore`]), prefixing every key and letting the store enforce TTL.
//!
//! The store cannot list keys, so every memory backend built from the same
//! [`KeyRegistry`] shares one used-key set. `destroy_all` on any instance
//! sweeps every key written by all of them, whatever their prefix.
//!
//! [`SharedMemoryStore`]: crate::cache::SharedMemoryStore

use std::sync::Arc;

use serde_json::Value;

use crate::cache::backend::CacheBackend;
use crate::cache::keyed::KeyedStore;
use crate::cache::options::CacheOptions;
use crate::cache::registry::KeyRegistry;
use crate::cache::store::KeyValueStore;
use crate::error::Result;

// == Memory Backend ==
/// Cache backend over a shared in-process key/value store.
#[derive(Debug)]
pub struct MemoryBackend {
    inner: KeyedStore,
}

impl MemoryBackend {
    /// Creates a memory backend.
    ///
    /// Recognized options: `ttl` and `prefix`. Fails with
    /// `BackendUnavailable` when the store lacks a required primitive.
    pub fn new(
        options: &CacheOptions,
        store: Arc<dyn KeyValueStore>,
        registry: Arc<KeyRegistry>,
    ) -> Result<Self> {
        Ok(Self {
            inner: KeyedStore::new("memory", options, store, registry)?,
        })
    }

    pub fn prefix(&self) -> &str {
        self.inner.prefix()
    }

    pub fn ttl(&self) -> u64 {
        self.inner.ttl()
    }
}

impl CacheBackend for MemoryBackend {
    fn write(&self, key: &str, value: Value) -> Result<()> {
        self.inner.write(key, value)
    }

    fn read(&self, key: &str) -> Result<Value> {
        self.inner.read(key)
    }

    fn validate(&self, key: &str) -> bool {
        self.inner.validate(key)
    }

    fn destroy(&self, key: &str) -> Result<()> {
        self.inner.destroy(key)
    }

    fn destroy_all(&self) -> Result<()> {
        self.inner.destroy_all()
    }
}
