//! Router error types.

use hermes_codec::EncodingError;
use hermes_core::MediaTypeError;
use thiserror::Error;

/// A registration that cannot be built.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The media type specializer does not parse.
    #[error("invalid media type: {0}")]
    InvalidMediaType(#[from] MediaTypeError),

    /// No handler body was supplied.
    #[error("registration has no handler")]
    MissingHandler,

    /// The same keyword was declared twice.
    #[error("keyword '{0}' declared more than once")]
    DuplicateKeyword(String),

    /// A keyword name is empty.
    #[error("keyword names must not be empty")]
    EmptyKeyword,

    /// A default value does not satisfy its own specializer.
    #[error("default for {slot} is not a valid {expected}")]
    DefaultMismatch {
        /// The parameter, e.g. `optional positional 1` or `keyword 'page'`.
        slot: String,
        /// The specializer.
        expected: String,
    },
}

/// Failure to generate a path.
///
/// These indicate a caller mistake (asking for a path no registration can
/// produce), not a client error.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No resource by that name.
    #[error("no such resource: '{0}'")]
    UnknownResource(String),

    /// No registration accepts this many positional values.
    #[error("no registration of '{resource}' takes {count} positional value(s)")]
    NoMatchingShape {
        /// Resource name.
        resource: String,
        /// Number of positional values supplied.
        count: usize,
    },

    /// A supplied keyword is not declared by the registration.
    #[error("'{resource}' does not declare keyword '{keyword}'")]
    UnknownKeyword {
        /// Resource name.
        resource: String,
        /// The keyword.
        keyword: String,
    },

    /// A required keyword was not supplied.
    #[error("'{resource}' requires keyword '{keyword}'")]
    MissingKeyword {
        /// Resource name.
        resource: String,
        /// The keyword.
        keyword: String,
    },

    /// The same keyword was supplied twice.
    #[error("keyword '{0}' supplied more than once")]
    DuplicateKeyword(String),

    /// Every encoding of the values would resolve to a registration that
    /// decodes them differently.
    #[error("no path for '{resource}' resolves back to the given values")]
    Ambiguous {
        /// Resource name.
        resource: String,
    },

    /// A value could not be encoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
