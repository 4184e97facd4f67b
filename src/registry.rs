//! Registry Module
//!
//! Maps URL schemes to driver openers so callers can pick a backend at
//! runtime from a URL such as `ramcache://?cleanupinterval=1m`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};
use url::Url;

use crate::driver::Cache;
use crate::error::{CacheError, Result};

// == URL Opener ==
/// Builds a configured driver from a parsed cache URL.
pub trait UrlOpener: Send + Sync {
    fn open_cache_url(&self, url: &Url) -> Result<Box<dyn Cache>>;
}

impl<F> UrlOpener for F
where
    F: Fn(&Url) -> Result<Box<dyn Cache>> + Send + Sync,
{
    fn open_cache_url(&self, url: &Url) -> Result<Box<dyn Cache>> {
        self(url)
    }
}

// == Cache Registry ==
/// Scheme to opener table.
///
/// Registration and lookup are guarded by a lock, so a registry can be
/// shared across threads behind an `Arc`.
#[derive(Default)]
pub struct CacheRegistry {
    openers: RwLock<HashMap<String, Arc<dyn UrlOpener>>>,
}

impl CacheRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every driver shipped in this crate.
    pub fn with_builtin_drivers() -> Self {
        let registry = Self::new();
        if let Err(err) = crate::ramcache::register(&registry) {
            warn!("Skipping builtin driver: {}", err);
        }
        registry
    }

    // == Register ==
    /// Registers `opener` for `scheme`.
    ///
    /// Fails with [`CacheError::SchemeAlreadyRegistered`] if the scheme is
    /// taken.
    pub fn register(&self, scheme: &str, opener: impl UrlOpener + 'static) -> Result<()> {
        let scheme = scheme.to_ascii_lowercase();
        let mut openers = self
            .openers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if openers.contains_key(&scheme) {
            return Err(CacheError::SchemeAlreadyRegistered(scheme));
        }

        debug!("Registered cache opener for scheme {}", scheme);
        openers.insert(scheme, Arc::new(opener));
        Ok(())
    }

    // == Open ==
    /// Parses `url` and opens a cache with the opener registered for its
    /// scheme.
    pub fn open(&self, url: &str) -> Result<Box<dyn Cache>> {
        let url = Url::parse(url)?;

        // Release the lock before running the opener
        let opener = self
            .openers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url.scheme())
            .cloned()
            .ok_or_else(|| CacheError::NoCache(url.scheme().to_string()))?;

        debug!("Opening cache for scheme {}", url.scheme());
        opener.open_cache_url(&url)
    }

    /// Returns the registered schemes, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self
            .openers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        schemes.sort();
        schemes
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}
