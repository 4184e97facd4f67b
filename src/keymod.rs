//! Key modifiers
//!
//! Helpers for building keys with prefixes, suffixes and hash tags. Drivers
//! backed by a cluster place keys sharing a `{tag}` on the same node; the
//! in-memory driver treats them as ordinary strings.

use std::fmt;

/// A function that rewrites a key.
pub type KeyModifier = Box<dyn Fn(String) -> String + Send + Sync>;

// == Key ==
/// A cache key built from composable parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prepends `text` to the key.
    pub fn prefix(self, text: &str) -> Self {
        let mut key = String::with_capacity(text.len() + self.0.len());
        key.push_str(text);
        key.push_str(&self.0);
        Self(key)
    }

    /// Appends `text` to the key.
    pub fn suffix(mut self, text: &str) -> Self {
        self.0.push_str(text);
        self
    }

    /// Prepends `{text}` to the key.
    pub fn tag_prefix(self, text: &str) -> Self {
        self.prefix(&format!("{{{text}}}"))
    }

    /// Appends `{text}` to the key.
    pub fn tag_suffix(self, text: &str) -> Self {
        self.suffix(&format!("{{{text}}}"))
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.0
    }
}

// == Modifiers ==
/// Returns a modifier that prefixes keys with `{hash_tag}`.
///
/// A tag that itself contains braces would produce an ambiguous key, so such
/// a modifier leaves keys unchanged.
pub fn hash_tag(hash_tag: impl Into<String>) -> KeyModifier {
    let hash_tag = hash_tag.into();
    Box::new(move |key| {
        if hash_tag.contains('{') || hash_tag.contains('}') {
            return key;
        }
        format!("{{{hash_tag}}}{key}")
    })
}

/// Applies `modifiers` to `key` in order.
pub fn modify_key(key: impl Into<String>, modifiers: &[KeyModifier]) -> String {
    modifiers
        .iter()
        .fold(key.into(), |key, modifier| modifier(key))
}
