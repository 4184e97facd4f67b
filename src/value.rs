//! Value Module
//!
//! Converts caller values into the byte payloads every driver stores.
//!
//! Raw bytes and text are stored as-is. Other values go through the first
//! capability they were built with, in this order of precedence: binary
//! marshaling, text marshaling, JSON, `Display`, and finally a reader that is
//! consumed to the end. [`Value::of`] accepts any `'static` value and defers
//! the "unsupported type" decision to [`Value::encode`].

use std::any::{type_name, Any};
use std::fmt::{self, Display, Write as _};
use std::io::Read;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{CacheError, Result};

// == Capabilities ==
/// A value that can encode itself into a binary form.
pub trait BinaryMarshal: Send {
    fn marshal_binary(&self) -> anyhow::Result<Vec<u8>>;
}

/// A value that can encode itself into a textual form.
pub trait TextMarshal: Send {
    fn marshal_text(&self) -> anyhow::Result<String>;
}

// == Value ==
/// A value ready to be handed to [`Cache::set`](crate::Cache::set).
pub struct Value(Repr);

enum Repr {
    Raw(Bytes),
    Binary(Box<dyn BinaryMarshal>),
    Text(Box<dyn TextMarshal>),
    Json(serde_json::Result<Vec<u8>>),
    Display(std::result::Result<String, fmt::Error>),
    Reader(Box<dyn Read + Send>),
    Unsupported(&'static str),
}

impl Value {
    /// Wraps a value implementing [`BinaryMarshal`].
    pub fn binary(value: impl BinaryMarshal + 'static) -> Self {
        Value(Repr::Binary(Box::new(value)))
    }

    /// Wraps a value implementing [`TextMarshal`].
    pub fn text_marshal(value: impl TextMarshal + 'static) -> Self {
        Value(Repr::Text(Box::new(value)))
    }

    /// Serializes a value to JSON.
    ///
    /// Serialization runs immediately; a failure is reported when the value is
    /// stored.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Value(Repr::Json(serde_json::to_vec(value)))
    }

    /// Stores the `Display` rendering of a value.
    pub fn display<T: Display + ?Sized>(value: &T) -> Self {
        let mut rendered = String::new();
        let result = write!(rendered, "{value}").map(|_| rendered);
        Value(Repr::Display(result))
    }

    /// Reads the whole stream when the value is stored.
    ///
    /// [`Value::encode`] reads synchronously. Drivers run reader values on
    /// the blocking thread pool, so a slow stream does not stall the runtime.
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Value(Repr::Reader(Box::new(reader)))
    }

    /// Returns true if encoding this value reads from a stream.
    pub fn is_reader(&self) -> bool {
        matches!(self.0, Repr::Reader(_))
    }

    /// Accepts a value of any type, keeping it only if it is raw bytes, text
    /// or a JSON document.
    ///
    /// Any other type yields a value that fails with
    /// [`CacheError::UnsupportedValueType`] when stored. Only unsized byte
    /// slices are recognised: a byte string literal such as `b"abc"` is a
    /// fixed-size array reference, so pass it through `Value::from` (or
    /// `.into()`) instead.
    pub fn of<T: Any>(value: T) -> Self {
        let boxed: Box<dyn Any> = Box::new(value);
        let boxed = match boxed.downcast::<Vec<u8>>() {
            Ok(v) => return Value::from(*v),
            Err(b) => b,
        };
        let boxed = match boxed.downcast::<Bytes>() {
            Ok(v) => return Value::from(*v),
            Err(b) => b,
        };
        let boxed = match boxed.downcast::<&'static [u8]>() {
            Ok(v) => return Value::from(*v),
            Err(b) => b,
        };
        let boxed = match boxed.downcast::<String>() {
            Ok(v) => return Value::from(*v),
            Err(b) => b,
        };
        let boxed = match boxed.downcast::<&'static str>() {
            Ok(v) => return Value::from(*v),
            Err(b) => b,
        };
        match boxed.downcast::<serde_json::Value>() {
            Ok(v) => Value::from(*v),
            Err(_) => Value(Repr::Unsupported(type_name::<T>())),
        }
    }

    // == Encode ==
    /// Produces the byte payload for this value.
    pub fn encode(self) -> Result<Bytes> {
        match self.0 {
            Repr::Raw(bytes) => Ok(bytes),
            Repr::Binary(value) => value
                .marshal_binary()
                .map(Bytes::from)
                .map_err(|e| CacheError::marshal("binary", e)),
            Repr::Text(value) => value
                .marshal_text()
                .map(Bytes::from)
                .map_err(|e| CacheError::marshal("text", e)),
            Repr::Json(result) => result
                .map(Bytes::from)
                .map_err(|e| CacheError::marshal("json", e)),
            Repr::Display(result) => result
                .map(Bytes::from)
                .map_err(|e| CacheError::marshal("display", e)),
            Repr::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader
                    .read_to_end(&mut buf)
                    .map_err(|e| CacheError::marshal("reader", e))?;
                Ok(Bytes::from(buf))
            }
            Repr::Unsupported(name) => Err(CacheError::UnsupportedValueType(name)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Raw(bytes) => f.debug_tuple("Raw").field(bytes).finish(),
            Repr::Binary(_) => f.write_str("Binary(..)"),
            Repr::Text(_) => f.write_str("TextMarshal(..)"),
            Repr::Json(_) => f.write_str("Json(..)"),
            Repr::Display(_) => f.write_str("Display(..)"),
            Repr::Reader(_) => f.write_str("Reader(..)"),
            Repr::Unsupported(name) => f.debug_tuple("Unsupported").field(name).finish(),
        }
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value(Repr::Raw(value))
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value(Repr::Raw(Bytes::from(value)))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value(Repr::Raw(Bytes::copy_from_slice(value)))
    }
}

impl<const N: usize> From<&[u8; N]> for Value {
    fn from(value: &[u8; N]) -> Self {
        Value::from(&value[..])
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value(Repr::Raw(Bytes::from(value)))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value(Repr::Raw(Bytes::copy_from_slice(value.as_bytes())))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::json(&value)
    }
}
