//! TTL validation

use chrono::TimeDelta;

use crate::error::{CacheError, Result};

/// Validates a TTL, rejecting negative durations.
///
/// A zero TTL is valid and means the entry never expires.
pub fn validate_ttl(ttl: TimeDelta) -> Result<()> {
    if ttl < TimeDelta::zero() {
        return Err(CacheError::InvalidTtl(ttl));
    }
    Ok(())
}
