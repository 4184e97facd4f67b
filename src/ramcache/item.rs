//! Cache Item Module
//!
//! Defines a stored payload together with its expiration policy.

use std::time::Instant;

use bytes::Bytes;
use chrono::TimeDelta;

// == Expiry ==
/// When an item stops being visible.
///
/// Expiry instants are monotonic, so wall-clock adjustments never expire an
/// item early or keep it alive late.
///
/// Variant order matters: the derived `Ord` sorts every `At` before `Never`,
/// so items that never expire come last in an expiry-ordered snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expiry {
    At(Instant),
    Never,
}

impl Expiry {
    /// Computes the expiry for a TTL measured from now. A zero TTL never
    /// expires; neither does one too large to represent.
    pub fn after(ttl: TimeDelta) -> Self {
        if ttl.is_zero() {
            return Expiry::Never;
        }
        ttl.to_std()
            .ok()
            .and_then(|ttl| Instant::now().checked_add(ttl))
            .map_or(Expiry::Never, Expiry::At)
    }
}

// == Cache Item ==
/// A single stored value and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    value: Bytes,
    expiry: Expiry,
}

impl Item {
    // == Constructors ==
    /// Creates an item that expires at `expires_at`.
    pub fn new(value: Bytes, expires_at: Instant) -> Self {
        Self {
            value,
            expiry: Expiry::At(expires_at),
        }
    }

    /// Creates an item that never expires.
    pub fn persistent(value: Bytes) -> Self {
        Self {
            value,
            expiry: Expiry::Never,
        }
    }

    /// Creates an item with an explicit expiry.
    pub fn with_expiry(value: Bytes, expiry: Expiry) -> Self {
        Self { value, expiry }
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    // == Is Expired ==
    /// Checks if the item has expired.
    ///
    /// An item expires once the current time is strictly after its expiry
    /// instant. Items without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a given instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expiry {
            Expiry::At(expires_at) => now > expires_at,
            Expiry::Never => false,
        }
    }
}
