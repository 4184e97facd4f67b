//! Cache Store Module
//!
//! Lock-guarded map from key to item. The store never interprets expiry on
//! its own read paths; the driver and the eviction task decide what an
//! expired item means.

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::ramcache::Item;

// == Cache Store ==
/// Concurrency-safe item storage.
#[derive(Debug, Default)]
pub struct Store {
    items: RwLock<HashMap<String, Item>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns a copy of the item stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<Item> {
        self.items.read().await.get(key).cloned()
    }

    // == Set ==
    /// Inserts or overwrites the item stored under `key`.
    pub async fn set(&self, key: String, item: Item) {
        self.items.write().await.insert(key, item);
    }

    // == Delete ==
    /// Removes `key`, returning the item it held. Absent keys are a no-op.
    pub async fn delete(&self, key: &str) -> Option<Item> {
        self.items.write().await.remove(key)
    }

    /// Removes `key` only if the item currently stored under it has expired.
    ///
    /// Returns true if an item was removed. A key overwritten with a fresh
    /// item since it was last read is left alone.
    pub async fn delete_expired(&self, key: &str) -> bool {
        self.delete_expired_at(key, Instant::now()).await
    }

    /// Like [`Store::delete_expired`], judging expiry against `now`.
    pub async fn delete_expired_at(&self, key: &str, now: Instant) -> bool {
        let mut items = self.items.write().await;
        match items.get(key) {
            Some(item) if item.is_expired_at(now) => {
                items.remove(key);
                true
            }
            _ => false,
        }
    }

    // == Clear ==
    /// Drops every entry.
    pub async fn clear(&self) {
        *self.items.write().await = HashMap::new();
    }

    // == Snapshot ==
    /// Copies all entries, ordered by ascending expiry.
    ///
    /// Items that never expire come after every item with an expiry, so a
    /// caller walking the result can stop at the first live item.
    pub async fn snapshot_sorted_by_expiry(&self) -> Vec<(String, Item)> {
        let mut entries: Vec<(String, Item)> = {
            let items = self.items.read().await;
            items
                .iter()
                .map(|(key, item)| (key.clone(), item.clone()))
                .collect()
        };
        entries.sort_by_key(|(_, item)| item.expiry());
        entries
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
