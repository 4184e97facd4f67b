//! Configuration Module
//!
//! Handles loading the in-memory driver options from environment variables or
//! from the query string of a `ramcache://` URL.

use std::env;
use std::time::Duration;

use chrono::TimeDelta;
use tracing::warn;
use url::Url;

use crate::error::{CacheError, Result};

/// Interval used when no positive cleanup interval is configured.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Longest cleanup interval honoured; longer values are capped to it.
pub const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Environment variable read by [`RamCacheOptions::from_env`].
pub const CLEANUP_INTERVAL_ENV: &str = "RAMCACHE_CLEANUP_INTERVAL";

/// In-memory driver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamCacheOptions {
    /// How often the eviction task sweeps expired entries
    pub cleanup_interval: Duration,
}

impl RamCacheOptions {
    /// Creates options with the given cleanup interval, revised to a sensible
    /// value.
    pub fn new(cleanup_interval: Duration) -> Self {
        let mut options = Self { cleanup_interval };
        options.revise();
        options
    }

    /// Replaces a non-positive cleanup interval with the default and caps
    /// it at [`MAX_CLEANUP_INTERVAL`].
    pub fn revise(&mut self) {
        if self.cleanup_interval.is_zero() {
            self.cleanup_interval = DEFAULT_CLEANUP_INTERVAL;
        }
        self.cleanup_interval = self.cleanup_interval.min(MAX_CLEANUP_INTERVAL);
    }

    /// Creates options by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `RAMCACHE_CLEANUP_INTERVAL` - Duration string such as `30s` or `5m`
    ///   (default: 5m)
    ///
    /// An unset or unparseable variable falls back to the default.
    pub fn from_env() -> Self {
        let interval = env::var(CLEANUP_INTERVAL_ENV)
            .ok()
            .and_then(|v| parse_duration(&v).ok())
            .map(non_negative)
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL);
        Self::new(interval)
    }

    /// Creates options from the query parameters of a cache URL.
    ///
    /// ```text
    /// ramcache://?cleanupinterval=30s
    /// ```
    pub fn from_url(url: &Url) -> Result<Self> {
        Self::from_query(url.query_pairs())
    }

    /// Creates options from key-value pairs.
    ///
    /// Keys are matched case-insensitively against the known fields; unknown
    /// keys are ignored. When a key repeats, its first value wins.
    pub fn from_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut interval = None;

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key.to_ascii_lowercase().as_str() {
                "cleanupinterval" | "cleanup_interval" => {
                    if interval.is_some() {
                        continue;
                    }
                    let parsed = parse_duration(value).map_err(|reason| {
                        CacheError::InvalidOption {
                            name: key.to_string(),
                            reason,
                        }
                    })?;
                    interval = Some(non_negative(parsed));
                }
                _ => warn!("Ignoring unknown ramcache option: {}", key),
            }
        }

        Ok(Self::new(interval.unwrap_or(Duration::ZERO)))
    }
}

impl Default for RamCacheOptions {
    fn default() -> Self {
        Self {
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

fn non_negative(delta: TimeDelta) -> Duration {
    delta.to_std().unwrap_or(Duration::ZERO)
}

// == Duration Parsing ==
/// Parses a duration string such as `300ms`, `1.5h` or `-2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0`
/// is accepted without a unit.
pub fn parse_duration(input: &str) -> std::result::Result<TimeDelta, String> {
    let invalid = || format!("invalid duration {input:?}");

    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
        let number: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        rest = &rest[unit_len..];
        total_nanos += number * unit_nanos;
    }

    if total_nanos > i64::MAX as f64 {
        return Err(invalid());
    }
    let nanos = total_nanos.round() as i64;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}
