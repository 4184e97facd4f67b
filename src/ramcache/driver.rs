//! In-memory Driver
//!
//! Translates the [`Cache`] contract into store operations with expiry
//! semantics.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::TimeDelta;
use tokio::sync::watch;
use tokio::task;
use tracing::debug;
use url::Url;

use crate::config::RamCacheOptions;
use crate::driver::Cache;
use crate::error::{CacheError, Result};
use crate::ramcache::{Expiry, Item, Store, SCHEME};
use crate::registry::{CacheRegistry, UrlOpener};
use crate::tasks::spawn_eviction_task;
use crate::ttl::validate_ttl;
use crate::value::Value;

// == Ram Cache ==
/// In-memory cache driver.
///
/// Owns one [`Store`] and one eviction task. The task stops on
/// [`Cache::close`] or when the driver is dropped.
#[derive(Debug)]
pub struct RamCache {
    store: Arc<Store>,
    options: RamCacheOptions,
    stop: watch::Sender<bool>,
}

impl RamCache {
    // == Constructor ==
    /// Creates a driver and starts its eviction task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(mut options: RamCacheOptions) -> Self {
        options.revise();

        let store = Arc::new(Store::new());
        let (stop, stop_rx) = watch::channel(false);
        spawn_eviction_task(store.clone(), options.cleanup_interval, stop_rx);

        Self {
            store,
            options,
            stop,
        }
    }

    pub fn options(&self) -> &RamCacheOptions {
        &self.options
    }

    /// Returns true once [`Cache::close`] has been called.
    pub fn is_closed(&self) -> bool {
        *self.stop.borrow()
    }

    /// The backing store, shared with the eviction task.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    async fn store_value(&self, key: &str, value: Value, expiry: Expiry) -> Result<()> {
        // Encode before touching the lock
        let payload = if value.is_reader() {
            task::spawn_blocking(move || value.encode())
                .await
                .map_err(|e| CacheError::marshal("reader", e))??
        } else {
            value.encode()?
        };
        self.store
            .set(key.to_string(), Item::with_expiry(payload, expiry))
            .await;
        Ok(())
    }

    /// Looks up a live item, deleting it if it has expired.
    async fn live_item(&self, key: &str) -> Option<Item> {
        let item = self.store.get(key).await?;
        if item.is_expired() {
            self.store.delete_expired(key).await;
            return None;
        }
        Some(item)
    }
}

impl Default for RamCache {
    fn default() -> Self {
        Self::new(RamCacheOptions::default())
    }
}

#[async_trait]
impl Cache for RamCache {
    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.store_value(key, value, Expiry::Never).await
    }

    async fn set_with_ttl(&self, key: &str, value: Value, ttl: TimeDelta) -> Result<()> {
        validate_ttl(ttl)?;
        self.store_value(key, value, Expiry::after(ttl)).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_item(key).await.is_some())
    }

    async fn count(&self, _pattern: &str) -> Result<i64> {
        Err(CacheError::PatternMatchingNotSupported { operation: "Count" })
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.live_item(key)
            .await
            .map(|item| item.value().clone())
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    // An expired entry still in the map counts as absent, as it does for
    // `get` and `exists`. It is removed either way.
    async fn del(&self, key: &str) -> Result<()> {
        match self.store.delete(key).await {
            Some(item) if !item.is_expired() => Ok(()),
            _ => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    async fn del_keys(&self, _pattern: &str) -> Result<()> {
        Err(CacheError::PatternMatchingNotSupported {
            operation: "DelKeys",
        })
    }

    async fn clear(&self) -> Result<()> {
        self.store.clear().await;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if !self.stop.send_replace(true) {
            debug!("Closing ramcache, eviction task signalled to stop");
        }
        Ok(())
    }
}

// == URL Opener ==
/// Opens a fresh [`RamCache`] for each `ramcache://` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct RamCacheOpener;

impl UrlOpener for RamCacheOpener {
    fn open_cache_url(&self, url: &Url) -> Result<Box<dyn Cache>> {
        let options = RamCacheOptions::from_url(url)?;
        Ok(Box::new(RamCache::new(options)))
    }
}

/// Registers the in-memory driver under [`SCHEME`].
pub fn register(registry: &CacheRegistry) -> Result<()> {
    registry.register(SCHEME, RamCacheOpener)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use std::io::{Cursor, Read};
    use std::time::Instant;

    use crate::tasks::sweep_expired;
    use tokio::time::sleep;

    fn new_cache() -> RamCache {
        RamCache::new(RamCacheOptions::new(Duration::from_secs(3600)))
    }

    /// Puts an already expired item straight into the store.
    async fn insert_expired(cache: &RamCache, key: &str) {
        cache
            .store()
            .set(key.to_string(), Item::new(Bytes::from("v"), Instant::now()))
            .await;
        sleep(Duration::from_millis(5)).await;
    }

    struct SlowReader {
        inner: Cursor<Vec<u8>>,
    }

    impl Read for SlowReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            std::thread::sleep(Duration::from_millis(10));
            self.inner.read(buf)
        }
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "stream reset"))
        }
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = new_cache();

        cache.set("k1", "v1".into()).await.unwrap();

        assert_eq!(cache.get("k1").await.unwrap(), Bytes::from("v1"));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let cache = new_cache();

        let err = cache.get("missing").await.unwrap_err();
        assert!(matches!(err, CacheError::KeyNotFound(ref key) if key == "missing"));
    }

    #[tokio::test]
    async fn test_set_with_ttl_expires() {
        let cache = new_cache();

        cache
            .set_with_ttl("k2", "v2".into(), TimeDelta::seconds(1))
            .await
            .unwrap();
        assert_eq!(cache.get("k2").await.unwrap(), Bytes::from("v2"));

        sleep(Duration::from_millis(1100)).await;

        assert!(cache.get("k2").await.unwrap_err().is_key_not_found());
        // Lazy expiry removed the entry from the store
        assert!(cache.store().get("k2").await.is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let cache = new_cache();

        cache
            .set_with_ttl("k", "v".into(), TimeDelta::zero())
            .await
            .unwrap();

        let item = cache.store().get("k").await.unwrap();
        assert_eq!(item.expiry(), Expiry::Never);
    }

    #[tokio::test]
    async fn test_negative_ttl_rejected() {
        let cache = new_cache();

        let err = cache
            .set_with_ttl("k3", "v3".into(), TimeDelta::seconds(-5))
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::InvalidTtl(_)));
        assert!(!cache.exists("k3").await.unwrap());
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_unsupported_value_rejected() {
        let cache = new_cache();

        let err = cache.set("k", Value::of(12345)).await.unwrap_err();

        assert!(matches!(err, CacheError::UnsupportedValueType(_)));
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_reader_value_is_read_off_the_runtime() {
        let cache = new_cache();
        let reader = SlowReader {
            inner: Cursor::new(b"streamed payload".to_vec()),
        };

        cache.set("k", Value::reader(reader)).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Bytes::from("streamed payload"));
    }

    #[tokio::test]
    async fn test_reader_failure_stores_nothing() {
        let cache = new_cache();

        let err = cache.set("k", Value::reader(BrokenReader)).await.unwrap_err();

        assert!(matches!(err, CacheError::Marshal { format: "reader", .. }));
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_ttl() {
        let cache = new_cache();

        cache
            .set_with_ttl("k", "first".into(), TimeDelta::milliseconds(100))
            .await
            .unwrap();
        cache
            .set_with_ttl("k", "second".into(), TimeDelta::hours(1))
            .await
            .unwrap();

        sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("k").await.unwrap(), Bytes::from("second"));
    }

    #[tokio::test]
    async fn test_exists() {
        let cache = new_cache();

        cache.set("k", "v".into()).await.unwrap();
        insert_expired(&cache, "old").await;

        assert!(cache.exists("k").await.unwrap());
        assert!(!cache.exists("missing").await.unwrap());
        assert!(!cache.exists("old").await.unwrap());
        assert!(cache.store().get("old").await.is_none());
    }

    #[tokio::test]
    async fn test_del() {
        let cache = new_cache();

        cache.set("k", "v".into()).await.unwrap();
        cache.del("k").await.unwrap();

        assert!(!cache.exists("k").await.unwrap());
        assert!(cache.del("k").await.unwrap_err().is_key_not_found());
    }

    #[tokio::test]
    async fn test_del_expired_entry_reports_not_found() {
        let cache = new_cache();
        insert_expired(&cache, "old").await;

        assert!(cache.del("old").await.unwrap_err().is_key_not_found());
        assert!(cache.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_del_after_sweep_matches_never_existed() {
        let cache = new_cache();
        insert_expired(&cache, "swept").await;

        assert_eq!(sweep_expired(cache.store()).await, 1);

        let swept = cache.del("swept").await.unwrap_err();
        let never = cache.del("never").await.unwrap_err();
        assert!(swept.is_key_not_found());
        assert!(never.is_key_not_found());
    }

    #[tokio::test]
    async fn test_pattern_operations_not_supported() {
        let cache = new_cache();

        assert!(matches!(
            cache.count("*").await,
            Err(CacheError::PatternMatchingNotSupported { operation: "Count" })
        ));
        assert!(matches!(
            cache.del_keys("*").await,
            Err(CacheError::PatternMatchingNotSupported {
                operation: "DelKeys"
            })
        ));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = new_cache();

        cache.set("a", "1".into()).await.unwrap();
        cache.set("b", "2".into()).await.unwrap();
        cache.clear().await.unwrap();

        assert!(!cache.exists("a").await.unwrap());
        assert!(!cache.exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_keeps_data() {
        let cache = new_cache();
        cache.set("k", "v".into()).await.unwrap();

        assert!(!cache.is_closed());
        cache.close().unwrap();
        cache.close().unwrap();
        assert!(cache.is_closed());

        cache.ping().await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Bytes::from("v"));
    }

    #[tokio::test]
    async fn test_background_sweep_removes_expired_entries() {
        let cache = RamCache::new(RamCacheOptions::new(Duration::from_millis(50)));

        cache
            .set_with_ttl("short", "v".into(), TimeDelta::milliseconds(20))
            .await
            .unwrap();
        cache.set("forever", "v".into()).await.unwrap();

        sleep(Duration::from_millis(250)).await;

        // Read the raw store so lazy expiry plays no part
        assert!(cache.store().get("short").await.is_none());
        assert!(cache.store().get("forever").await.is_some());
    }

    #[tokio::test]
    async fn test_opener_reads_url_options() {
        let url = Url::parse("ramcache://?cleanupinterval=2m").unwrap();
        let cache = RamCacheOpener.open_cache_url(&url).unwrap();

        cache.set("k", "v".into()).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Bytes::from("v"));
        cache.close().unwrap();
    }
}
