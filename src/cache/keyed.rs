//! Keyed Store Core
//!
//! Shared logic of the backends that sit on a [`KeyValueStore`]: key
//! prefixing, store-native TTL, and used-key bookkeeping for `destroy_all`.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::backend::{ensure_key, DEFAULT_PREFIX, DEFAULT_TTL};
use crate::cache::options::CacheOptions;
use crate::cache::registry::KeyRegistry;
use crate::cache::store::{KeyValueStore, StoreOp};
use crate::error::{CacheError, Result};

// == Keyed Store ==
#[derive(Debug)]
pub(crate) struct KeyedStore {
    /// Backend name, for log context
    backend: &'static str,
    store: Arc<dyn KeyValueStore>,
    registry: Arc<KeyRegistry>,
    prefix: String,
    ttl: u64,
}

impl KeyedStore {
    // == Constructor ==
    /// Probes the store for every required primitive, then applies `ttl`
    /// and `prefix`.
    pub(crate) fn new(
        backend: &'static str,
        options: &CacheOptions,
        store: Arc<dyn KeyValueStore>,
        registry: Arc<KeyRegistry>,
    ) -> Result<Self> {
        if let Some(missing) = StoreOp::ALL.into_iter().find(|op| !store.supports(*op)) {
            return Err(CacheError::BackendUnavailable(format!(
                "store primitive {}",
                missing
            )));
        }

        let ttl = options.u64("ttl")?.unwrap_or(DEFAULT_TTL);
        let prefix = options.str("prefix")?.unwrap_or(DEFAULT_PREFIX).to_string();

        Ok(Self {
            backend,
            store,
            registry,
            prefix,
            ttl,
        })
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    pub(crate) fn ttl(&self) -> u64 {
        self.ttl
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// A ttl of zero means the store keeps the value until deleted.
    fn store_ttl(&self) -> Option<u64> {
        (self.ttl > 0).then_some(self.ttl)
    }

    fn is_gone(&self, full_key: &str) -> bool {
        matches!(self.store.exists(full_key), Ok(false))
    }

    fn delete(&self, full_key: &str) -> Result<()> {
        self.store
            .delete(full_key)
            .map_err(|err| CacheError::Delete {
                target: format!("The key \"{}\"", full_key),
                reason: err.to_string(),
            })
    }

    // == Write ==
    pub(crate) fn write(&self, key: &str, value: Value) -> Result<()> {
        ensure_key(key)?;
        let full_key = self.namespaced(key);

        self.store
            .store(&full_key, value, self.store_ttl())
            .map_err(|err| CacheError::Write {
                key: full_key.clone(),
                reason: err.to_string(),
            })?;
        self.registry.add(&full_key);

        debug!(backend = self.backend, key = %full_key, "wrote cache record");
        Ok(())
    }

    // == Read ==
    pub(crate) fn read(&self, key: &str) -> Result<Value> {
        ensure_key(key)?;

        if !self.validate(key) {
            debug!(backend = self.backend, key, "cache miss");
            return Err(CacheError::InvalidKey(key.to_string()));
        }

        let full_key = self.namespaced(key);
        match self.store.fetch(&full_key) {
            Ok(Some(value)) => {
                debug!(backend = self.backend, key = %full_key, "cache hit");
                Ok(value)
            }
            Ok(None) => {
                self.registry.remove_if(&full_key, || self.is_gone(&full_key));
                Err(CacheError::InvalidKey(key.to_string()))
            }
            Err(err) => Err(CacheError::BackendUnavailable(err.to_string())),
        }
    }

    // == Validate ==
    pub(crate) fn validate(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        let full_key = self.namespaced(key);

        match self.store.exists(&full_key) {
            Ok(true) => true,
            Ok(false) => {
                self.registry.remove_if(&full_key, || self.is_gone(&full_key));
                false
            }
            Err(err) => {
                warn!(backend = self.backend, key = %full_key, error = %err, "existence probe failed");
                false
            }
        }
    }

    // == Destroy ==
    pub(crate) fn destroy(&self, key: &str) -> Result<()> {
        ensure_key(key)?;
        let full_key = self.namespaced(key);

        if !self.is_gone(&full_key) {
            self.delete(&full_key)?;
        }
        self.registry.remove_if(&full_key, || self.is_gone(&full_key));

        debug!(backend = self.backend, key = %full_key, "removed cache record");
        Ok(())
    }

    // == Destroy All ==
    /// Sweeps every key in the registry, stopping at the first failure.
    pub(crate) fn destroy_all(&self) -> Result<()> {
        let keys = self.registry.snapshot();
        let mut removed = 0usize;

        for full_key in keys {
            if !self.is_gone(&full_key) {
                self.delete(&full_key)?;
                removed += 1;
            }
            self.registry.remove_if(&full_key, || self.is_gone(&full_key));
        }

        info!(backend = self.backend, removed, "cleared keyed cache");
        Ok(())
    }
}
