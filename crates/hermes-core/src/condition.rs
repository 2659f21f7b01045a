//! Conditions: status-bearing dispatch and handler failures.
//!
//! Every failure the engine can turn into an HTTP response is a
//! [`Condition`]. Resolution failures (bad arguments, unknown resources,
//! verb or media mismatches) are produced by the resolver; handlers raise
//! explicit statuses with [`Condition::status`] and anything else they fail
//! with becomes [`Condition::InternalHandlerError`].
//!
//! | Kind | Status |
//! |---|---|
//! | `ArgumentDecode` | 400 |
//! | `KeywordValidation` | 400 |
//! | `ResourceUnknown` | 404 |
//! | `PathShapeMismatch` | 404 |
//! | `VerbNotAllowed` | 405 |
//! | `MediaTypeUnacceptable` | 406 |
//! | `UnsupportedPayloadType` | 415 |
//! | `InternalHandlerError` | 500 |
//! | `Status` | as raised |

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`Condition`].
pub type ConditionResult<T> = Result<T, Condition>;

/// Fieldless classification of a [`Condition`].
///
/// Used as a key for explanation hooks and as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// A positional argument could not be decoded.
    ArgumentDecode,
    /// No registration accepts the number of path segments.
    PathShapeMismatch,
    /// The resource name is not registered.
    ResourceUnknown,
    /// The path matched but the verb is not accepted.
    VerbNotAllowed,
    /// No representation satisfies the accept specification.
    MediaTypeUnacceptable,
    /// No registration accepts the payload's content type.
    UnsupportedPayloadType,
    /// A keyword argument is unknown, missing, duplicated or malformed.
    KeywordValidation,
    /// An explicit status raised by a handler.
    Status,
    /// A handler failed with a non-status error.
    InternalHandlerError,
}

impl ConditionKind {
    /// Machine-readable code used in error envelopes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ArgumentDecode => "ARGUMENT_DECODE_ERROR",
            Self::PathShapeMismatch => "PATH_SHAPE_MISMATCH",
            Self::ResourceUnknown => "RESOURCE_UNKNOWN",
            Self::VerbNotAllowed => "VERB_NOT_ALLOWED",
            Self::MediaTypeUnacceptable => "MEDIA_TYPE_UNACCEPTABLE",
            Self::UnsupportedPayloadType => "UNSUPPORTED_PAYLOAD_TYPE",
            Self::KeywordValidation => "KEYWORD_VALIDATION_ERROR",
            Self::Status => "HTTP_STATUS",
            Self::InternalHandlerError => "INTERNAL_HANDLER_ERROR",
        }
    }

    /// Snake-case name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArgumentDecode => "argument_decode",
            Self::PathShapeMismatch => "path_shape_mismatch",
            Self::ResourceUnknown => "resource_unknown",
            Self::VerbNotAllowed => "verb_not_allowed",
            Self::MediaTypeUnacceptable => "media_type_unacceptable",
            Self::UnsupportedPayloadType => "unsupported_payload_type",
            Self::KeywordValidation => "keyword_validation",
            Self::Status => "status",
            Self::InternalHandlerError => "internal_handler_error",
        }
    }
}

/// Error returned for status codes outside `100..=599`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("status code {0} is outside 100..=599")]
pub struct InvalidStatus(pub u16);

/// A status-bearing failure.
///
/// # Example
///
/// ```
/// use hermes_core::{Condition, ConditionKind};
/// use http::StatusCode;
///
/// let condition = Condition::status(StatusCode::CONFLICT).with_detail("widget is locked");
/// assert_eq!(condition.kind(), ConditionKind::Status);
/// assert_eq!(condition.status_code(), StatusCode::CONFLICT);
/// assert_eq!(condition.to_string(), "widget is locked");
/// ```
#[derive(Debug, Error)]
pub enum Condition {
    /// A positional argument could not be decoded.
    #[error("cannot decode {slot}: {message}")]
    ArgumentDecode {
        /// Which argument failed.
        slot: String,
        /// Why it failed.
        message: String,
    },

    /// No registration accepts the number of path segments.
    #[error("no registration of '{resource}' accepts {segments} positional segment(s)")]
    PathShapeMismatch {
        /// Resource name.
        resource: String,
        /// Number of positional segments in the request.
        segments: usize,
    },

    /// The resource name is not registered.
    #[error("no such resource: '{resource}'")]
    ResourceUnknown {
        /// Resource name as requested.
        resource: String,
    },

    /// The path matched but no registration accepts the verb.
    #[error("{verb} is not allowed on '{resource}'")]
    VerbNotAllowed {
        /// Resource name.
        resource: String,
        /// The rejected verb.
        verb: Method,
        /// Verbs accepted for this path shape, sorted.
        allowed: Vec<Method>,
    },

    /// No registration's media type satisfies the accept specification.
    #[error("no representation of '{resource}' satisfies '{accept}'")]
    MediaTypeUnacceptable {
        /// Resource name.
        resource: String,
        /// The accept specification as received.
        accept: String,
    },

    /// No registration accepts the request payload's media type.
    #[error("'{resource}' does not accept payloads of type '{content_type}'")]
    UnsupportedPayloadType {
        /// Resource name.
        resource: String,
        /// The content type as received.
        content_type: String,
    },

    /// A keyword argument is unknown, missing, duplicated or malformed.
    #[error("keyword '{keyword}': {message}")]
    KeywordValidation {
        /// Keyword name.
        keyword: String,
        /// What is wrong with it.
        message: String,
    },

    /// An explicit status raised on purpose.
    #[error("{}", status_line(.status, .detail))]
    Status {
        /// The status code.
        status: StatusCode,
        /// Optional human-readable detail.
        detail: Option<String>,
        /// Optional structured payload.
        payload: Option<serde_json::Value>,
    },

    /// A handler failed with something other than an explicit status.
    #[error("internal handler error: {source}")]
    InternalHandlerError {
        /// The underlying failure (never exposed to clients by default).
        #[source]
        source: anyhow::Error,
    },
}

fn status_line(status: &StatusCode, detail: &Option<String>) -> String {
    match detail {
        Some(detail) => detail.clone(),
        None => format!(
            "{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("HTTP condition")
        ),
    }
}

impl Condition {
    /// Creates an explicit status condition.
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self::Status {
            status,
            detail: None,
            payload: None,
        }
    }

    /// Creates an explicit status condition from a numeric code in `100..=599`.
    pub fn from_code(code: u16) -> Result<Self, InvalidStatus> {
        if !(100..=599).contains(&code) {
            return Err(InvalidStatus(code));
        }
        StatusCode::from_u16(code)
            .map(Self::status)
            .map_err(|_| InvalidStatus(code))
    }

    /// Wraps a non-status failure.
    pub fn internal(source: impl Into<anyhow::Error>) -> Self {
        Self::InternalHandlerError {
            source: source.into(),
        }
    }

    /// Creates a resource-unknown condition.
    #[must_use]
    pub fn resource_unknown(resource: impl Into<String>) -> Self {
        Self::ResourceUnknown {
            resource: resource.into(),
        }
    }

    /// Creates a keyword validation condition.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KeywordValidation {
            keyword: keyword.into(),
            message: message.into(),
        }
    }

    /// Attaches a human-readable detail to an explicit status condition.
    ///
    /// Other kinds carry their own detail and are returned unchanged.
    #[must_use]
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            Self::Status {
                status, payload, ..
            } => Self::Status {
                status,
                detail: Some(detail.into()),
                payload,
            },
            other => other,
        }
    }

    /// Attaches a structured payload to an explicit status condition.
    #[must_use]
    pub fn with_payload(self, payload: serde_json::Value) -> Self {
        match self {
            Self::Status { status, detail, .. } => Self::Status {
                status,
                detail,
                payload: Some(payload),
            },
            other => other,
        }
    }

    /// Returns the condition kind.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        match self {
            Self::ArgumentDecode { .. } => ConditionKind::ArgumentDecode,
            Self::PathShapeMismatch { .. } => ConditionKind::PathShapeMismatch,
            Self::ResourceUnknown { .. } => ConditionKind::ResourceUnknown,
            Self::VerbNotAllowed { .. } => ConditionKind::VerbNotAllowed,
            Self::MediaTypeUnacceptable { .. } => ConditionKind::MediaTypeUnacceptable,
            Self::UnsupportedPayloadType { .. } => ConditionKind::UnsupportedPayloadType,
            Self::KeywordValidation { .. } => ConditionKind::KeywordValidation,
            Self::Status { .. } => ConditionKind::Status,
            Self::InternalHandlerError { .. } => ConditionKind::InternalHandlerError,
        }
    }

    /// Returns the HTTP status code for this condition.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ArgumentDecode { .. } | Self::KeywordValidation { .. } => StatusCode::BAD_REQUEST,
            Self::PathShapeMismatch { .. } | Self::ResourceUnknown { .. } => StatusCode::NOT_FOUND,
            Self::VerbNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::MediaTypeUnacceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::UnsupportedPayloadType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Status { status, .. } => *status,
            Self::InternalHandlerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for wrapped non-status handler failures.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::InternalHandlerError { .. })
    }

    /// Verbs to advertise in an `Allow` header, for 405 conditions.
    pub fn allowed_verbs(&self) -> &[Method] {
        match self {
            Self::VerbNotAllowed { allowed, .. } => allowed,
            _ => &[],
        }
    }

    /// Structured payload attached to an explicit status, if any.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Status { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Converts this condition to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.kind().code().to_string(),
                message: self.to_string(),
                status: self.status_code().as_u16(),
                kind: self.kind(),
                details: self.details(),
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::VerbNotAllowed { allowed, .. } => Some(serde_json::json!({
                "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>()
            })),
            Self::PathShapeMismatch { segments, .. } => Some(serde_json::json!({
                "segments": segments
            })),
            Self::Status {
                payload: Some(payload),
                ..
            } => Some(payload.clone()),
            Self::InternalHandlerError { source } => Some(serde_json::json!({
                "chain": source.chain().map(ToString::to_string).collect::<Vec<_>>()
            })),
            _ => None,
        }
    }
}

/// Serializable error envelope for verbose responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    pub status: u16,
    /// Condition kind.
    pub kind: ConditionKind,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Whether a class of failures is caught and converted, or propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Let the failure escape to the calling environment (debugging).
    Propagate,
    /// Convert to a terse status-only response.
    #[default]
    Catch,
    /// Convert to a response carrying diagnostic detail.
    Verbose,
}

impl ErrorPolicy {
    /// Returns `true` unless the policy propagates.
    #[must_use]
    pub const fn catches(self) -> bool {
        !matches!(self, Self::Propagate)
    }

    /// Returns `true` for the verbose policy.
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                Condition::ArgumentDecode {
                    slot: "positional argument 0".into(),
                    message: "bad".into(),
                },
                400,
            ),
            (Condition::keyword("q", "unknown keyword"), 400),
            (Condition::resource_unknown("widget"), 404),
            (
                Condition::PathShapeMismatch {
                    resource: "widget".into(),
                    segments: 2,
                },
                404,
            ),
            (
                Condition::VerbNotAllowed {
                    resource: "widget".into(),
                    verb: Method::DELETE,
                    allowed: vec![Method::GET],
                },
                405,
            ),
            (
                Condition::MediaTypeUnacceptable {
                    resource: "widget".into(),
                    accept: "application/xml".into(),
                },
                406,
            ),
            (
                Condition::UnsupportedPayloadType {
                    resource: "widget".into(),
                    content_type: "text/csv".into(),
                },
                415,
            ),
            (Condition::internal(anyhow::anyhow!("boom")), 500),
            (Condition::status(StatusCode::PAYMENT_REQUIRED), 402),
        ];

        for (condition, expected) in cases {
            assert_eq!(condition.status_code().as_u16(), expected, "{condition:?}");
        }
    }

    #[test]
    fn test_from_code_range() {
        assert_eq!(
            Condition::from_code(409).unwrap().status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(Condition::from_code(99).unwrap_err(), InvalidStatus(99));
        assert_eq!(Condition::from_code(600).unwrap_err(), InvalidStatus(600));
    }

    #[test]
    fn test_status_display_without_detail() {
        let condition = Condition::status(StatusCode::CONFLICT);
        assert_eq!(condition.to_string(), "409 Conflict");
    }

    #[test]
    fn test_with_detail_only_touches_status() {
        let condition = Condition::resource_unknown("widget").with_detail("ignored");
        assert_eq!(condition.to_string(), "no such resource: 'widget'");
    }

    #[test]
    fn test_allowed_verbs() {
        let condition = Condition::VerbNotAllowed {
            resource: "widget".into(),
            verb: Method::DELETE,
            allowed: vec![Method::GET, Method::PUT],
        };
        assert_eq!(condition.allowed_verbs(), &[Method::GET, Method::PUT]);
        assert!(Condition::resource_unknown("x").allowed_verbs().is_empty());
    }

    #[test]
    fn test_envelope_serialization() {
        let condition = Condition::status(StatusCode::CONFLICT)
            .with_detail("locked")
            .with_payload(serde_json::json!({"holder": "alice"}));
        let json = serde_json::to_value(condition.to_envelope()).unwrap();

        assert_eq!(json["error"]["code"], "HTTP_STATUS");
        assert_eq!(json["error"]["status"], 409);
        assert_eq!(json["error"]["kind"], "status");
        assert_eq!(json["error"]["details"]["holder"], "alice");
    }

    #[test]
    fn test_internal_survives_anyhow_round_trip() {
        let err = anyhow::Error::from(Condition::status(StatusCode::GONE));
        let condition = err.downcast::<Condition>().unwrap();
        assert_eq!(condition.status_code(), StatusCode::GONE);
        assert!(!condition.is_internal());
    }

    #[test]
    fn test_error_policy() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Catch);
        assert!(ErrorPolicy::Catch.catches());
        assert!(!ErrorPolicy::Propagate.catches());
        assert!(ErrorPolicy::Verbose.is_verbose());

        let parsed: ErrorPolicy = serde_json::from_str("\"verbose\"").unwrap();
        assert_eq!(parsed, ErrorPolicy::Verbose);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ConditionKind::VerbNotAllowed.as_str(), "verb_not_allowed");
        assert_eq!(
            serde_json::to_string(&ConditionKind::VerbNotAllowed).unwrap(),
            "\"verb_not_allowed\""
        );
    }
}
