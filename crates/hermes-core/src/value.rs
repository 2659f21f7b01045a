//! Typed argument values and the type specializers that constrain them.

use std::fmt;

use serde::Serialize;

/// A decoded URI argument.
///
/// The default codec only ever produces numbers, strings and symbols.
/// [`Value::Object`] is reserved for per-resource codecs that map URI text to
/// domain objects (for example a record looked up by id).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// Quoted or plain string.
    String(String),
    /// Bare symbol-like token.
    Symbol(String),
    /// Domain object produced by a resource codec.
    Object {
        /// Object kind, matched by [`TypeSpec::Object`].
        kind: String,
        /// Object data.
        data: serde_json::Value,
    },
}

impl Value {
    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Creates a string value.
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Creates a domain object value.
    pub fn object(kind: impl Into<String>, data: serde_json::Value) -> Self {
        Self::Object {
            kind: kind.into(),
            data,
        }
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object { kind, .. } => kind,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric value of integers and floats.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the text of strings and symbols.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Converts to JSON for handlers that render arguments.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Object { kind, data } => write!(f, "#<{kind} {data}>"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A type specializer on a positional or keyword argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSpec {
    /// Accepts any value (the untyped specializer).
    #[default]
    Any,
    /// Integers and floats.
    Number,
    /// Integers only.
    Integer,
    /// Floats; integer literals are widened by the default codec.
    Float,
    /// Strings; the default codec reads any unquoted token as its text.
    String,
    /// Bare symbol tokens.
    Symbol,
    /// Domain objects of the given kind.
    Object(String),
}

impl TypeSpec {
    /// Specificity used for tie-breaking: `Any` < `Number` < everything else.
    #[must_use]
    pub const fn specificity(&self) -> u8 {
        match self {
            Self::Any => 0,
            Self::Number => 1,
            _ => 2,
        }
    }

    /// Returns `true` if `value` satisfies this specializer as-is.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _)
            | (Self::Number, Value::Integer(_) | Value::Float(_))
            | (Self::Integer, Value::Integer(_))
            | (Self::Float, Value::Float(_))
            | (Self::String, Value::String(_))
            | (Self::Symbol, Value::Symbol(_)) => true,
            (Self::Object(expected), Value::Object { kind, .. }) => expected == kind,
            _ => false,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Number => f.write_str("number"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::Symbol => f.write_str("symbol"),
            Self::Object(kind) => f.write_str(kind),
        }
    }
}
