//! Cache Store Module
//!
//! In-process set-once map with per-entry TTL expiration.

use std::collections::HashMap;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::CacheEntry;

// == Local Store ==
/// Set-once key/value storage backing the local cache.
///
/// Not synchronized; callers hold an exclusive lock around every call so the
/// lookup and the insert in [`LocalStore::get_or_set`] happen as one step.
#[derive(Debug)]
pub struct LocalStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// TTL in seconds applied to every inserted entry
    ttl: u64,
}

impl LocalStore {
    // == Constructor ==
    /// Creates an empty store whose entries live for `ttl` seconds.
    pub fn new(ttl: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    // == Get Or Set ==
    /// Returns the live value for `key`, installing `value` if there is none.
    ///
    /// An expired entry is treated as absent and replaced.
    pub fn get_or_set(&mut self, key: &str, value: String) -> String {
        let now = current_timestamp_ms();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired_at(now) {
                return entry.value.clone();
            }
        }

        let entry = CacheEntry::new(value, self.ttl);
        let stored = entry.value.clone();
        self.entries.insert(key.to_string(), entry);
        stored
    }

    // == Delete ==
    /// Removes the entry for `key`. Missing keys are ignored.
    pub fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }

    // == Purge Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Clear ==
    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Length ==
    /// Returns the number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// TTL in seconds applied to new entries.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_store_new() {
        let store = LocalStore::new(300);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.ttl(), 300);
    }

    #[test]
    fn test_get_or_set_new_mapping() {
        let mut store = LocalStore::new(300);

        let value = store.get_or_set("key1", "val1".to_string());

        assert_eq!(value, "val1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_or_set_existing_mapping() {
        let mut store = LocalStore::new(300);

        store.get_or_set("key1", "val1".to_string());
        let value = store.get_or_set("key1", "val2".to_string());

        assert_eq!(value, "val1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_then_get_or_set() {
        let mut store = LocalStore::new(300);

        store.get_or_set("key1", "val1".to_string());
        store.delete("key1");

        assert!(store.is_empty());
        assert_eq!(store.get_or_set("key1", "val2".to_string()), "val2");
    }

    #[test]
    fn test_delete_nonexistent() {
        let mut store = LocalStore::new(300);
        store.delete("nonexistent");
        assert!(store.is_empty());
    }

    #[test]
    fn test_expired_entry_is_replaced() {
        let mut store = LocalStore::new(1);

        store.get_or_set("key1", "val1".to_string());
        assert_eq!(store.get_or_set("key1", "val2".to_string()), "val1");

        sleep(Duration::from_millis(1100));

        assert_eq!(store.get_or_set("key1", "val3".to_string()), "val3");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let mut short = LocalStore::new(1);
        short.get_or_set("key1", "val1".to_string());
        short.get_or_set("key2", "val2".to_string());

        sleep(Duration::from_millis(1100));

        assert_eq!(short.purge_expired(), 2);
        assert!(short.is_empty());
    }

    #[test]
    fn test_purge_keeps_live_entries() {
        let mut store = LocalStore::new(300);
        store.get_or_set("key1", "val1".to_string());

        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.get_or_set("key1", "other".to_string()), "val1");
    }

    #[test]
    fn test_clear() {
        let mut store = LocalStore::new(300);
        store.get_or_set("key1", "val1".to_string());
        store.get_or_set("key2", "val2".to_string());

        store.clear();
        assert!(store.is_empty());
    }
}
