//! Decoded handler arguments.
//!
//! This module provides storage for the positional and keyword values the
//! resolver extracts from a request path and query string, using a
//! small-vector optimization to avoid heap allocations for common cases
//! (1-4 arguments).

use smallvec::SmallVec;

use crate::Value;

/// Maximum number of arguments stored inline (stack allocated).
const INLINE_ARGS: usize = 4;

/// Positional and keyword arguments decoded from a request.
///
/// Keyword order is not significant for equality.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Arguments, Value};
///
/// let mut args = Arguments::new();
/// args.push_positional(Value::Integer(42));
/// args.insert_keyword("format", Value::symbol("short"));
///
/// assert_eq!(args.positional(0), Some(&Value::Integer(42)));
/// assert_eq!(args.keyword("format"), Some(&Value::symbol("short")));
/// assert_eq!(args.keyword("unknown"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positional: SmallVec<[Value; INLINE_ARGS]>,
    keywords: SmallVec<[(String, Value); INLINE_ARGS]>,
}

impl Arguments {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an argument set from positional values only.
    pub fn from_positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keywords: SmallVec::new(),
        }
    }

    /// Appends a positional value.
    pub fn push_positional(&mut self, value: Value) {
        self.positional.push(value);
    }

    /// Sets a keyword value, replacing an earlier value for the same name.
    pub fn insert_keyword(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.keywords.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.keywords.push((name, value));
        }
    }

    /// Builder-style [`insert_keyword`](Self::insert_keyword).
    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert_keyword(name, value);
        self
    }

    /// Returns the positional value at `index`.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// All positional values in order.
    pub fn positionals(&self) -> &[Value] {
        &self.positional
    }

    /// Returns the value of a keyword argument.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates keyword arguments in insertion order.
    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keywords.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of positional values.
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Number of keyword values.
    pub fn keyword_len(&self) -> usize {
        self.keywords.len()
    }

    /// Returns true if there are no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

impl PartialEq for Arguments {
    fn eq(&self, other: &Self) -> bool {
        self.positional == other.positional
            && self.keywords.len() == other.keywords.len()
            && self
                .keywords
                .iter()
                .all(|(name, value)| other.keyword(name) == Some(value))
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_positional(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_new() {
        let args = Arguments::new();
        assert!(args.is_empty());
        assert_eq!(args.positional_len(), 0);
        assert_eq!(args.keyword_len(), 0);
    }

    #[test]
    fn test_insert_keyword_replaces() {
        let mut args = Arguments::new();
        args.insert_keyword("a", Value::Integer(1));
        args.insert_keyword("a", Value::Integer(2));
        assert_eq!(args.keyword_len(), 1);
        assert_eq!(args.keyword("a"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_equality_ignores_keyword_order() {
        let a = Arguments::from_positional([Value::Integer(1)])
            .with_keyword("x", Value::symbol("one"))
            .with_keyword("y", Value::symbol("two"));
        let b = Arguments::from_positional([Value::Integer(1)])
            .with_keyword("y", Value::symbol("two"))
            .with_keyword("x", Value::symbol("one"));
        assert_eq!(a, b);

        let c = Arguments::from_positional([Value::Integer(1)]).with_keyword("x", Value::symbol("one"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_many_positionals_spill() {
        let args: Arguments = (0..10).map(Value::Integer).collect();
        assert_eq!(args.positional_len(), 10);
        assert_eq!(args.positional(7), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_keywords_iter_in_insertion_order() {
        let args = Arguments::new()
            .with_keyword("b", Value::Integer(2))
            .with_keyword("a", Value::Integer(1));
        let names: Vec<_> = args.keywords().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
