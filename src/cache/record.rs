//! Stored Record Module
//!
//! The envelope persisted by the file backend: a cached value plus the time
//! it was last written.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// == Stored Record ==
/// A cached value wrapped with its write timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Unix timestamp (seconds) of the most recent successful write
    pub written_at: i64,
    /// The payload last written
    pub value: Value,
    /// Any other envelope fields, carried across rewrites untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredRecord {
    // == Constructor ==
    /// Creates a fresh envelope stamped with the current time.
    pub fn new(value: Value) -> Self {
        Self {
            written_at: current_timestamp(),
            value,
            extra: Map::new(),
        }
    }

    // == Refresh ==
    /// Replaces the payload and restamps the envelope, keeping extra fields.
    pub fn refresh(mut self, value: Value) -> Self {
        self.value = value;
        self.written_at = current_timestamp();
        self
    }

    // == Age ==
    /// Seconds elapsed since the last write. A timestamp in the future
    /// counts as zero; an unrepresentable distance saturates.
    pub fn age(&self) -> u64 {
        current_timestamp().saturating_sub(self.written_at).max(0) as u64
    }

    // == Is Expired ==
    /// A record is stale once its age strictly exceeds the ttl.
    pub fn is_expired(&self, ttl: u64) -> bool {
        self.age() > ttl
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}
