//! Driver Module
//!
//! The uniform contract every cache backend implements.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::TimeDelta;

use crate::error::Result;
use crate::value::Value;

// == Cache Trait ==
/// Key-value operations shared by every cache driver.
///
/// Callers pick a driver at runtime (see [`CacheRegistry`](crate::CacheRegistry))
/// and use it through `Box<dyn Cache>` from then on.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Stores a value that never expires, replacing any existing entry.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Stores a value that expires after `ttl`.
    ///
    /// A zero TTL behaves like [`Cache::set`]; a negative TTL fails with
    /// [`CacheError::InvalidTtl`](crate::CacheError::InvalidTtl).
    async fn set_with_ttl(&self, key: &str, value: Value, ttl: TimeDelta) -> Result<()>;

    /// Reports whether a live entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Counts the keys matching `pattern`.
    async fn count(&self, pattern: &str) -> Result<i64>;

    /// Returns the payload stored under `key`.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Removes `key`, failing with `KeyNotFound` if it is absent.
    async fn del(&self, key: &str) -> Result<()>;

    /// Removes every key matching `pattern`.
    async fn del_keys(&self, pattern: &str) -> Result<()>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;

    /// Verifies the cache is reachable.
    async fn ping(&self) -> Result<()>;

    /// Releases resources held by the driver. Calling it more than once is a
    /// no-op.
    fn close(&self) -> Result<()>;
}
