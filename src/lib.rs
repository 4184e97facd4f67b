//! Unicache - A unified caching facade
//!
//! One [`Cache`] trait for key-value operations, backed by drivers selected at
//! runtime by URL scheme. Ships with an in-memory driver featuring TTL expiry
//! and a background eviction sweep.
//!
//! ```ignore
//! let registry = CacheRegistry::with_builtin_drivers();
//! let cache = registry.open("ramcache://?cleanupinterval=1m")?;
//! cache.set_with_ttl("session", "token".into(), TimeDelta::minutes(30)).await?;
//! let token = cache.get("session").await?;
//! cache.close()?;
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod keymod;
pub mod ramcache;
pub mod registry;
pub mod tasks;
pub mod ttl;
pub mod value;

pub use config::RamCacheOptions;
pub use driver::Cache;
pub use error::{CacheError, Result};
pub use ramcache::RamCache;
pub use registry::{CacheRegistry, UrlOpener};
pub use value::{BinaryMarshal, TextMarshal, Value};
