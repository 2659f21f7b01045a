//! HTTP verb specializers.
//!
//! A registration either accepts one verb or every verb. This module also
//! fixes the order verbs are listed in `Allow` headers.

use std::fmt;

use http::Method;

/// The verb a registration accepts.
///
/// # Example
///
/// ```rust
/// use hermes_router::VerbSpec;
/// use http::Method;
///
/// assert!(VerbSpec::Any.matches(&Method::DELETE));
/// assert!(VerbSpec::Exact(Method::GET).matches(&Method::GET));
/// assert!(!VerbSpec::Exact(Method::GET).matches(&Method::HEAD));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VerbSpec {
    /// Every verb.
    #[default]
    Any,
    /// One verb.
    Exact(Method),
}

impl VerbSpec {
    /// Returns `true` if `verb` satisfies this specializer.
    pub fn matches(&self, verb: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(method) => method == verb,
        }
    }

    /// Returns `true` if some request verb satisfies both specializers.
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            _ => true,
        }
    }

    /// The single verb, for exact specializers.
    pub fn method(&self) -> Option<&Method> {
        match self {
            Self::Any => None,
            Self::Exact(method) => Some(method),
        }
    }
}

impl From<Method> for VerbSpec {
    fn from(method: Method) -> Self {
        Self::Exact(method)
    }
}

impl fmt::Display for VerbSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Exact(method) => f.write_str(method.as_str()),
        }
    }
}

/// Returns `true` for verbs whose request payload is judged by content type
/// (`POST`, `PUT`, `PATCH`) rather than by the `Accept` header.
pub fn carries_body(verb: &Method) -> bool {
    matches!(*verb, Method::POST | Method::PUT | Method::PATCH)
}

fn rank(method: &Method) -> u8 {
    match *method {
        Method::GET => 0,
        Method::POST => 1,
        Method::PUT => 2,
        Method::DELETE => 3,
        Method::PATCH => 4,
        Method::HEAD => 5,
        Method::OPTIONS => 6,
        Method::TRACE => 7,
        Method::CONNECT => 8,
        _ => u8::MAX,
    }
}

/// Sorts and deduplicates verbs for an `Allow` header.
///
/// Standard verbs come first in a fixed order; extension verbs follow
/// alphabetically.
pub fn sort_verbs(mut verbs: Vec<Method>) -> Vec<Method> {
    verbs.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.as_str().cmp(b.as_str())));
    verbs.dedup();
    verbs
}

/// Renders verbs as an `Allow` header value.
pub fn allow_header(verbs: &[Method]) -> String {
    verbs
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
