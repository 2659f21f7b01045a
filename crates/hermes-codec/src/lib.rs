//! # Hermes Codec
//!
//! Conversion between URI text and typed argument [`Value`]s.
//!
//! Every resource decodes its path segments and query values through an
//! [`ArgumentCodec`]. [`DefaultCodec`] handles numbers, strings and symbols;
//! a resource can install its own codec to map URI text to domain objects,
//! provided `decode` and `encode` stay mutually inverse so that generated
//! paths resolve back to the values they were built from.
//!
//! ```rust
//! use hermes_codec::{ArgumentCodec, DefaultCodec, Slot};
//! use hermes_core::{TypeSpec, Value};
//!
//! let codec = DefaultCodec;
//! let value = Value::Float(2.5);
//! let raw = codec.encode(&value, Slot::Keyword("scale"), &TypeSpec::Number).unwrap();
//! assert_eq!(codec.decode(&raw, Slot::Keyword("scale"), &TypeSpec::Number).unwrap(), value);
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-codec/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod default;
mod error;
pub mod escape;
mod token;

use std::fmt;

pub use default::DefaultCodec;
pub use error::{ArgumentError, EncodingError};
use hermes_core::{TypeSpec, Value};

/// Which argument a piece of URI text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot<'a> {
    /// A path segment, by zero-based position.
    Positional(usize),
    /// A query-string keyword, by name.
    Keyword(&'a str),
}

impl Slot<'_> {
    /// Returns `true` for query-string keywords.
    pub const fn is_keyword(self) -> bool {
        matches!(self, Self::Keyword(_))
    }
}

impl fmt::Display for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional(index) => write!(f, "positional argument {index}"),
            Self::Keyword(name) => write!(f, "keyword '{name}'"),
        }
    }
}

/// Converts between URI text and typed values.
///
/// `raw` text is still percent-encoded; `encode` must return percent-encoded
/// text. For every value `v` that `decode` produces under a specializer,
/// `decode(encode(v))` must yield `v` again.
pub trait ArgumentCodec: Send + Sync {
    /// Decodes one path segment or query value.
    fn decode(&self, raw: &str, slot: Slot<'_>, spec: &TypeSpec) -> Result<Value, ArgumentError>;

    /// Encodes a value as one path segment or query value.
    fn encode(&self, value: &Value, slot: Slot<'_>, spec: &TypeSpec) -> Result<String, EncodingError>;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl fmt::Debug for dyn ArgumentCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArgumentCodec({})", self.name())
    }
}
