//! Requests and responses at the adapter boundary.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use hermes_router::split_uri;

/// A request as handed over by a transport adapter.
///
/// # Example
///
/// ```rust
/// use hermes_engine::InboundRequest;
/// use http::Method;
///
/// let request = InboundRequest::new(Method::GET, "/widget/42?format=long")
///     .with_accept("text/html");
/// assert_eq!(request.path, "/widget/42");
/// assert_eq!(request.query, "format=long");
/// ```
#[derive(Debug, Clone)]
pub struct InboundRequest {
    /// Request verb.
    pub verb: Method,
    /// Path without the query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// `Content-Type` of the payload, if any.
    pub content_type: Option<String>,
    /// `Accept` specification, if any.
    pub accept: Option<String>,
    /// Raw payload.
    pub payload: Bytes,
}

impl InboundRequest {
    /// Creates a request from a verb and a request target (`path?query`).
    pub fn new(verb: Method, target: &str) -> Self {
        let (path, query) = split_uri(target);
        Self {
            verb,
            path: path.to_string(),
            query: query.to_string(),
            content_type: None,
            accept: None,
            payload: Bytes::new(),
        }
    }

    /// Sets the payload content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the accept specification.
    #[must_use]
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Converts an `http::Request`.
    ///
    /// Repeated `Accept` headers are joined into one list. Header values that
    /// are not visible ASCII are ignored.
    pub fn from_http(request: &Request<Bytes>) -> Self {
        let headers = request.headers();

        let accept: Vec<&str> = headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        Self {
            verb: request.method().clone(),
            path: request.uri().path().to_string(),
            query: request.uri().query().unwrap_or_default().to_string(),
            content_type: headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            accept: if accept.is_empty() {
                None
            } else {
                Some(accept.join(", "))
            },
            payload: request.body().clone(),
        }
    }

    /// The request target, `path` plus `?query` when a query is present.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// What the engine hands back to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    /// Response status.
    pub status: StatusCode,
    /// Body, absent for bare-status responses.
    pub body: Option<Bytes>,
    /// `Content-Type` of the body.
    pub content_type: Option<String>,
    /// Extra headers, e.g. `Allow` on 405.
    pub headers: HeaderMap,
}

impl OutboundResponse {
    /// A bare-status response.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: None,
            content_type: None,
            headers: HeaderMap::new(),
        }
    }

    /// Attaches a body and its content type.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>, content_type: Option<String>) -> Self {
        self.body = Some(body.into());
        self.content_type = content_type;
        self
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Converts into an `http::Response`.
    ///
    /// Fails only if the content type is not a valid header value.
    pub fn into_http(self) -> http::Result<Response<Bytes>> {
        let mut builder = Response::builder().status(self.status);

        if let Some(content_type) = &self.content_type {
            builder = builder.header(CONTENT_TYPE, HeaderValue::try_from(content_type.as_str())?);
        }
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers);
        }

        builder.body(self.body.unwrap_or_default())
    }
}
