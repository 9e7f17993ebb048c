//! Remote Backend Module
//!
//! Delegates to an external key/value service through a [`KeyValueStore`]
//! connection. The transport behind the connection is the caller's concern;
//! this backend only applies the cache contract on top of it.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::backend::CacheBackend;
use crate::cache::keyed::KeyedStore;
use crate::cache::options::CacheOptions;
use crate::cache::registry::KeyRegistry;
use crate::cache::store::KeyValueStore;
use crate::error::{CacheError, Result};

// == Remote Backend ==
/// Cache backend over a remote key/value store connection.
#[derive(Debug)]
pub struct RemoteBackend {
    inner: KeyedStore,
}

impl RemoteBackend {
    /// Creates a remote backend over `connection`.
    ///
    /// Recognized options: `ttl` and `prefix`.
    pub fn new(
        options: &CacheOptions,
        connection: Option<Arc<dyn KeyValueStore>>,
        registry: Arc<KeyRegistry>,
    ) -> Result<Self> {
        let connection = connection
            .ok_or_else(|| CacheError::BackendUnavailable("remote store connection".to_string()))?;

        Ok(Self {
            inner: KeyedStore::new("remote", options, connection, registry)?,
        })
    }

    pub fn prefix(&self) -> &str {
        self.inner.prefix()
    }
}

impl CacheBackend for RemoteBackend {
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
