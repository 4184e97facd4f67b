//! In-memory Cache Module
//!
//! A [`Cache`](crate::Cache) driver backed by a process-local map, with lazy
//! expiry on reads and a background eviction sweep. Data is lost when the
//! process exits.
//!
//! Pattern operations (`count`, `del_keys`) are not supported: the map keeps
//! no index to scan keys by pattern.
//!
//! # URL Format
//! ```text
//! ramcache://[?cleanupinterval=<duration>]
//! ```

mod driver;
mod item;
mod store;


// Re-export public types
pub use driver::{register, RamCache, RamCacheOpener};
pub use item::{Expiry, Item};
pub use store::Store;

/// URL scheme of the in-memory driver.
pub const SCHEME: &str = "ramcache";
