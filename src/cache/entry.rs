//! Shared Store Entry Module
//!
//! Defines the structure for entries held by the shared memory store.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Store Entry ==
/// A single shared-store entry with value and expiration metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional TTL in seconds
    ///
    /// A TTL too large to express as a timestamp never expires.
    pub fn new(value: Value, ttl_seconds: Option<u64>) -> Self {
        let now = current_timestamp_ms();
        let expires_at = ttl_seconds
            .and_then(|ttl| ttl.checked_mul(1000))
            .and_then(|ttl_ms| now.checked_add(ttl_ms));

        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    pub(crate) fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoreEntry::new(json!("test_value"), None);

        assert_eq!(entry.value, json!("test_value"));
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = StoreEntry::new(json!([1, 2, 3]), Some(60));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());

        let remaining_ms = entry.expires_at.unwrap() - current_timestamp_ms();
        assert!(remaining_ms <= 60_000);
        assert!(remaining_ms >= 59_000);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        for ttl in [u64::MAX / 2, u64::MAX / 1000, u64::MAX] {
            let entry = StoreEntry::new(json!("v"), Some(ttl));

            assert!(entry.expires_at.is_none());
            assert!(!entry.is_expired());
        }
    }

    #[test]
    fn test_entry_expiration() {
        let entry = StoreEntry::new(json!("test_value"), Some(1));

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let entry = StoreEntry {
            value: json!("test"),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - 1));
    }
}
