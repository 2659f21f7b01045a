//! Handler trait and the values that flow through it.
//!
//! A [`Handler`] receives an [`Invocation`] (the decoded arguments plus the
//! request payload) and produces a [`Reply`]. Handlers fail with
//! [`anyhow::Error`]; a failure that downcasts to [`Condition`](crate::Condition)
//! is treated as an explicit status, anything else as an internal error.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, StatusCode};

use crate::media::MediaType;
use crate::Arguments;

/// Boxed future returned by [`Handler::call`].
pub type BoxedReply = Pin<Box<dyn Future<Output = anyhow::Result<Reply>> + Send>>;

/// A registered handler body.
///
/// Implemented for any `Fn(Invocation) -> Future<Output = anyhow::Result<Reply>>`,
/// so async closures and functions can be registered directly.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Handler, Invocation, Reply};
///
/// async fn show(inv: Invocation) -> anyhow::Result<Reply> {
///     Ok(Reply::text(format!("widget {}", inv.arguments().positionals()[0])))
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(show);
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Invokes the handler.
    fn call(&self, invocation: Invocation) -> BoxedReply;
}

impl<F, Fut> Handler for F
where
    F: Fn(Invocation) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Reply>> + Send + 'static,
{
    fn call(&self, invocation: Invocation) -> BoxedReply {
        Box::pin(self(invocation))
    }
}

/// Shared, type-erased handler.
pub type SharedHandler = Arc<dyn Handler>;

/// Everything a handler is called with.
#[derive(Debug, Clone)]
pub struct Invocation {
    resource: String,
    verb: Method,
    arguments: Arguments,
    payload: Bytes,
    content_type: Option<MediaType>,
    response_type: Option<MediaType>,
}

impl Invocation {
    /// Creates an invocation.
    pub fn new(resource: impl Into<String>, verb: Method, arguments: Arguments) -> Self {
        Self {
            resource: resource.into(),
            verb,
            arguments,
            payload: Bytes::new(),
            content_type: None,
            response_type: None,
        }
    }

    /// Attaches the request payload and its content type.
    pub fn with_payload(mut self, payload: Bytes, content_type: Option<MediaType>) -> Self {
        self.payload = payload;
        self.content_type = content_type;
        self
    }

    /// Sets the negotiated response media type.
    pub fn with_response_type(mut self, response_type: Option<MediaType>) -> Self {
        self.response_type = response_type;
        self
    }

    /// Resource name the request was dispatched to.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The request verb.
    pub fn verb(&self) -> &Method {
        &self.verb
    }

    /// Decoded positional and keyword arguments.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Raw request payload (empty for verbs without a body).
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Parsed request content type, if one was sent.
    pub fn content_type(&self) -> Option<&MediaType> {
        self.content_type.as_ref()
    }

    /// Negotiated response media type, if one could be determined.
    pub fn response_type(&self) -> Option<&MediaType> {
        self.response_type.as_ref()
    }

    /// Deserializes the payload as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// A successful handler result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    status: StatusCode,
    body: Bytes,
    content_type: Option<String>,
}

impl Reply {
    /// A 200 reply with the given body and no explicit content type.
    ///
    /// The engine fills in the negotiated response type.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            content_type: None,
        }
    }

    /// A 204 reply.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Bytes::new(),
            content_type: None,
        }
    }

    /// A 200 `text/plain` reply.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok(body.into()).with_content_type("text/plain; charset=utf-8")
    }

    /// A 200 `application/json` reply.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::ok(body).with_content_type("application/json"))
    }

    /// Overrides the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets an explicit content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The explicit content type, if set.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Splits the reply into its parts.
    pub fn into_parts(self) -> (StatusCode, Bytes, Option<String>) {
        (self.status, self.body, self.content_type)
    }
}
