//! Codec error types.

use thiserror::Error;

/// Failure to decode one URI argument.
///
/// The resolver turns these into 400-class conditions: positional failures
/// eliminate a candidate registration, keyword failures reject the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The text is not a well-formed literal (for example an unterminated
    /// quoted string, or a number too large to represent).
    #[error("{slot}: malformed literal '{text}': {reason}")]
    Malformed {
        /// Which argument failed.
        slot: String,
        /// The decoded text.
        text: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The literal decoded, but to a value the specializer rejects.
    #[error("{slot}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Which argument failed.
        slot: String,
        /// The specializer.
        expected: String,
        /// Type of the decoded value.
        found: String,
    },

    /// Percent-decoding produced invalid UTF-8.
    #[error("{slot}: percent-encoding does not decode to UTF-8")]
    InvalidEncoding {
        /// Which argument failed.
        slot: String,
    },

    /// A resource codec refused the text.
    #[error("{slot}: {message}")]
    Rejected {
        /// Which argument failed.
        slot: String,
        /// The codec's reason.
        message: String,
    },
}

impl ArgumentError {
    /// Creates a [`Rejected`](Self::Rejected) error for custom codecs.
    pub fn rejected(slot: impl ToString, message: impl Into<String>) -> Self {
        Self::Rejected {
            slot: slot.to_string(),
            message: message.into(),
        }
    }

    /// Describes the failing argument (for example `positional argument 0`).
    pub fn slot(&self) -> &str {
        match self {
            Self::Malformed { slot, .. }
            | Self::TypeMismatch { slot, .. }
            | Self::InvalidEncoding { slot }
            | Self::Rejected { slot, .. } => slot,
        }
    }

    /// The failure without the slot prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Malformed { text, reason, .. } => format!("malformed literal '{text}': {reason}"),
            Self::TypeMismatch {
                expected, found, ..
            } => format!("expected {expected}, found {found}"),
            Self::InvalidEncoding { .. } => "percent-encoding does not decode to UTF-8".to_string(),
            Self::Rejected { message, .. } => message.clone(),
        }
    }
}

/// Failure to encode a value into URI text.
///
/// Encoding failures are programming errors in the caller, not client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The value has no textual form that decodes back to it.
    #[error("{slot}: cannot encode {value}: {reason}")]
    Unencodable {
        /// Which argument.
        slot: String,
        /// The value, rendered for diagnostics.
        value: String,
        /// Why it cannot be encoded.
        reason: String,
    },

    /// The value does not satisfy the argument's specializer.
    #[error("{slot}: {value} is not a valid {expected}")]
    TypeMismatch {
        /// Which argument.
        slot: String,
        /// The value, rendered for diagnostics.
        value: String,
        /// The specializer.
        expected: String,
    },
}

impl EncodingError {
    /// Creates an [`Unencodable`](Self::Unencodable) error for custom codecs.
    pub fn unencodable(
        slot: impl ToString,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Unencodable {
            slot: slot.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
