//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use chrono::TimeDelta;
use thiserror::Error;

/// Boxed error used as the chained cause of marshaling failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// == Cache Error Enum ==
/// Unified error type for every cache driver and the registry.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache (or found but already expired)
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The driver has no index to scan keys by pattern
    #[error("{operation} not supported: pattern matching not supported")]
    PatternMatchingNotSupported { operation: &'static str },

    /// A negative TTL was supplied
    #[error("invalid TTL: {0}")]
    InvalidTtl(TimeDelta),

    /// The value matches none of the accepted serialization capabilities
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(&'static str),

    /// A value's own serialization capability failed
    #[error("failed to marshal value as {format}")]
    Marshal {
        format: &'static str,
        #[source]
        source: BoxError,
    },

    /// No opener is registered for the URL scheme
    #[error("no cache implementation registered for scheme: {0}")]
    NoCache(String),

    /// An opener is already registered for the scheme
    #[error("scheme already registered: {0}")]
    SchemeAlreadyRegistered(String),

    /// The cache URL could not be parsed
    #[error("invalid cache URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configuration option carried an unusable value
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: String, reason: String },
}

impl CacheError {
    /// Wraps a marshaling failure, keeping the cause inspectable.
    pub(crate) fn marshal(format: &'static str, source: impl Into<BoxError>) -> Self {
        CacheError::Marshal {
            format,
            source: source.into(),
        }
    }

    /// Returns true for `KeyNotFound`.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, CacheError::KeyNotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_marshal_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = CacheError::marshal("reader", io);

        assert_eq!(err.to_string(), "failed to marshal value as reader");
        let source = err.source().expect("source should be chained");
        assert_eq!(source.to_string(), "short read");
    }

    #[test]
    fn test_pattern_error_names_operation() {
        let err = CacheError::PatternMatchingNotSupported { operation: "Count" };
        assert_eq!(
            err.to_string(),
            "Count not supported: pattern matching not supported"
        );
        assert!(!err.is_key_not_found());
    }
}
