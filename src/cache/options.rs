//! Cache Options Module
//!
//! String-keyed backend configuration. Backends pick out the options they
//! declare and ignore everything else.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Cache Options ==
/// Option name to value mapping handed to a backend constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheOptions(BTreeMap<String, Value>);

impl CacheOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets (or replaces) a single option.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the raw value of an option.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // == Typed Accessors ==
    /// Reads a non-negative integer option.
    ///
    /// Returns `Ok(None)` when the option is absent and `InvalidOption` when
    /// it is present but not a non-negative integer.
    pub fn u64(&self, name: &'static str) -> Result<Option<u64>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| CacheError::InvalidOption {
                name,
                reason: format!("expected a non-negative integer, got {}", value),
            }),
        }
    }

    /// Reads a string option.
    pub fn str(&self, name: &'static str) -> Result<Option<&str>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| CacheError::InvalidOption {
                name,
                reason: format!("expected a string, got {}", value),
            }),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for CacheOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}
