//! In-memory client over an [`Engine`].

use std::sync::Arc;

use bytes::Bytes;
use hermes_engine::{Engine, InboundRequest};
use http::Method;

use crate::error::TestError;
use crate::response::TestResponse;

/// Sends requests straight into an [`Engine`], no sockets involved.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Invocation, Reply};
/// use hermes_engine::Engine;
/// use hermes_router::Registration;
/// use hermes_test::TestClient;
/// use http::{Method, StatusCode};
///
/// # tokio_test::block_on(async {
/// let engine = Engine::builder()
///     .register(
///         "ping",
///         Registration::builder()
///             .verb(Method::GET)
///             .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::text("pong")) })
///             .build()
///             .unwrap(),
///     )
///     .build();
///
/// let client = TestClient::new(engine);
/// client
///     .get("/ping")
///     .send()
///     .await
///     .assert_status(StatusCode::OK)
///     .assert_body_eq("pong");
/// # });
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestClient {
    engine: Arc<Engine>,
    default_accept: Option<String>,
}

impl TestClient {
    /// Wraps an engine.
    pub fn new(engine: Engine) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    /// Wraps a shared engine.
    pub fn from_shared(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            default_accept: None,
        }
    }

    /// Accept specification sent when a request sets none.
    pub fn with_default_accept(mut self, accept: impl Into<String>) -> Self {
        self.default_accept = Some(accept.into());
        self
    }

    /// The engine under test.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Creates a GET request builder.
    pub fn get(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, target)
    }

    /// Creates a POST request builder.
    pub fn post(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, target)
    }

    /// Creates a PUT request builder.
    pub fn put(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, target)
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, target)
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, target)
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, target: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::HEAD, target)
    }

    /// Creates a request builder with any verb.
    pub fn request(&self, verb: Method, target: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut request = InboundRequest::new(verb, target.as_ref());
        request.accept.clone_from(&self.default_accept);
        TestClientRequest {
            client: self,
            request,
            query: Vec::new(),
        }
    }
}

/// A request builder bound to a [`TestClient`].
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: InboundRequest,
    query: Vec<String>,
}

impl TestClientRequest<'_> {
    /// Sets the accept specification.
    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.request.accept = Some(accept.into());
        self
    }

    /// Sets the payload content type.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request.content_type = Some(content_type.into());
        self
    }

    /// Sets the raw payload.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.payload = body.into();
        self
    }

    /// Sets a JSON payload and content type.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    #[must_use]
    pub fn json<T: serde::Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_vec(value).expect("JSON-serializable test payload");
        self.content_type("application/json").body(body)
    }

    /// Appends a percent-encoded `key=value` pair to the query string.
    #[must_use]
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query
            .push(format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)));
        self
    }

    fn finish(mut self) -> (InboundRequest, Arc<Engine>) {
        if !self.query.is_empty() {
            let extra = self.query.join("&");
            self.request.query = if self.request.query.is_empty() {
                extra
            } else {
                format!("{}&{extra}", self.request.query)
            };
        }
        (self.request, Arc::clone(&self.client.engine))
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the engine escalates instead of responding.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("dispatch should produce a response")
    }

    /// Sends the request, returning escalations as errors.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let (request, engine) = self.finish();
        let response = engine.dispatch(request).await?;
        Ok(response.into())
    }
}
