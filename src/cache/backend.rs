//! Cache Backend Contract
//!
//! The capability set every storage driver implements.

use std::fmt;

use serde_json::Value;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default record lifetime in seconds.
pub const DEFAULT_TTL: u64 = 3600;

/// Default namespace prefix for keyed stores.
pub const DEFAULT_PREFIX: &str = "koi_";

// == Cache Backend Trait ==
/// A storage driver behind the cache facade.
///
/// All operations are synchronous and may block on disk or store I/O.
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: Value) -> Result<()>;

    /// Returns the live value under `key`.
    fn read(&self, key: &str) -> Result<Value>;

    /// Whether `key` currently holds a live record.
    fn validate(&self, key: &str) -> bool;

    /// Removes `key`. Removing an absent key succeeds.
    fn destroy(&self, key: &str) -> Result<()>;

    /// Removes every record this backend is responsible for.
    ///
    /// Not transactional: a failure leaves earlier removals in place.
    fn destroy_all(&self) -> Result<()>;
}

/// Rejects the empty key.
pub(crate) fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey(String::new()));
    }
    Ok(())
}
