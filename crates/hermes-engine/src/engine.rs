//! The dispatch engine.
//!
//! [`Engine::dispatch`] runs one request through path splitting, resolution,
//! handler invocation and condition mapping. Explicit status conditions and
//! internal errors each have their own [`ErrorPolicy`].

use std::any::Any;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures_util::FutureExt;
use hermes_config::{DispatchConfig, HermesConfig};
use hermes_codec::ArgumentCodec;
use hermes_core::{AcceptList, Condition, ErrorPolicy, Invocation, MediaType, MediaTypeError, Reply, Value};
use hermes_router::{
    allow_header, GenerationError, PathGenerator, Registration, Registry, RequestPath, RequestTriple,
    Resolution, Resolver,
};
use hermes_telemetry::{record_condition, record_dispatch};
use http::header::{HeaderValue, ALLOW};
use http::Method;
use thiserror::Error;
use tracing::{debug, warn};

use crate::explain::{Explain, ExplainContext, ExplainKey, ExplainRegistry};
use crate::{InboundRequest, OutboundResponse};

/// Resource name reported when `/` is requested and no home resource is set.
const ROOT: &str = "/";

/// A condition the active policy let escape instead of converting.
#[derive(Debug, Error)]
#[error("unhandled condition on '{resource}': {condition}")]
pub struct Escalation {
    /// Resource the request addressed.
    pub resource: String,
    /// The escaped condition.
    #[source]
    pub condition: Condition,
}

impl Escalation {
    /// Unwraps the condition.
    pub fn into_condition(self) -> Condition {
        self.condition
    }
}

/// Resolves, invokes and maps requests over a shared [`Registry`].
///
/// # Example
///
/// ```rust
/// use hermes_core::{Invocation, Reply, TypeSpec};
/// use hermes_engine::{Engine, InboundRequest};
/// use hermes_router::Registration;
/// use http::{Method, StatusCode};
///
/// # tokio_test::block_on(async {
/// let engine = Engine::builder().build();
/// engine.register(
///     "widget",
///     Registration::builder()
///         .verb(Method::GET)
///         .media("text/html")
///         .positional(TypeSpec::Integer)
///         .handler(|inv: Invocation| async move {
///             let id = inv.arguments().positional(0).cloned();
///             Ok::<_, anyhow::Error>(Reply::ok(format!("<p>{id:?}</p>")))
///         })
///         .build()
///         .unwrap(),
/// );
///
/// let ok = engine.dispatch(InboundRequest::new(Method::GET, "/widget/42")).await.unwrap();
/// assert_eq!(ok.status, StatusCode::OK);
/// assert_eq!(ok.content_type.as_deref(), Some("text/html"));
///
/// let bad = engine.dispatch(InboundRequest::new(Method::GET, "/widget/abc")).await.unwrap();
/// assert_eq!(bad.status, StatusCode::BAD_REQUEST);
/// assert!(bad.body.is_none());
/// # });
/// ```
#[derive(Debug)]
pub struct Engine {
    registry: Arc<Registry>,
    resolver: Resolver,
    generator: PathGenerator,
    dispatch: DispatchConfig,
    explain: ExplainRegistry,
}

impl Engine {
    /// Starts building an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Policy for explicit status conditions.
    pub fn conditions_policy(&self) -> ErrorPolicy {
        self.dispatch.conditions
    }

    /// Policy for internal handler errors.
    pub fn internal_errors_policy(&self) -> ErrorPolicy {
        self.dispatch.internal_errors
    }

    /// Registers a handler. Returns `true` if it replaced one with the same
    /// signature.
    pub fn register(&self, resource: &str, registration: Registration) -> bool {
        self.registry.register(resource, registration)
    }

    /// Installs a custom argument codec for `resource`.
    pub fn set_codec(&self, resource: &str, codec: Arc<dyn ArgumentCodec>) {
        self.registry.set_codec(resource, codec);
    }

    /// Declares `alias` equivalent to `canonical` for negotiation.
    pub fn alias_media_type(&self, alias: MediaType, canonical: MediaType) -> Result<(), MediaTypeError> {
        self.registry.alias_media_type(alias, canonical)
    }

    /// Builds a path that dispatches back to `resource` with these values.
    pub fn generate(
        &self,
        resource: &str,
        positional: &[Value],
        keywords: &[(&str, Value)],
    ) -> Result<String, GenerationError> {
        self.generator.generate(resource, positional, keywords)
    }

    /// Resolves without invoking. Useful for adapters that want to inspect
    /// the selected registration.
    pub fn resolve(&self, request: &InboundRequest) -> Result<Resolution, Condition> {
        let (resource, triple) = self.split(request);
        self.resolver.resolve(&resource, &triple)
    }

    /// Dispatches one request.
    ///
    /// Returns `Err` only when the policy for the failure's class is
    /// [`ErrorPolicy::Propagate`]. A handler panic under a propagating
    /// internal-error policy is resumed on the calling task.
    pub async fn dispatch(&self, request: InboundRequest) -> Result<OutboundResponse, Escalation> {
        let started = Instant::now();
        let (resource, triple) = self.split(&request);

        debug!(
            verb = %request.verb,
            path = %request.path,
            resource = %resource,
            "dispatching"
        );

        let result = match self.resolver.resolve(&resource, &triple) {
            Ok(resolution) => self.invoke(resolution, request.verb, request.payload).await,
            Err(condition) => {
                let preferred = AcceptList::from_header(triple.accept.as_deref())
                    .preferred_concrete()
                    .cloned();
                self.fail(condition, &resource, preferred.as_ref())
            }
        };

        let status = match &result {
            Ok(response) => response.status,
            Err(escalation) => escalation.condition.status_code(),
        };
        record_dispatch(&resource, status.as_u16(), started.elapsed());
        debug!(
            resource = %resource,
            status = status.as_u16(),
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "dispatched"
        );

        result
    }

    fn split(&self, request: &InboundRequest) -> (String, RequestTriple) {
        let (resource, segments) = RequestPath::parse(&request.path)
            .or_home(self.dispatch.home_resource.as_deref())
            .into_parts();

        let mut triple = RequestTriple::new(request.verb.clone(), segments).with_query(request.query.as_str());
        triple.content_type.clone_from(&request.content_type);
        triple.accept.clone_from(&request.accept);

        (resource.unwrap_or_else(|| ROOT.to_string()), triple)
    }

    async fn invoke(
        &self,
        resolution: Resolution,
        verb: Method,
        payload: Bytes,
    ) -> Result<OutboundResponse, Escalation> {
        let resource = resolution.resource.name().to_string();
        let response_type = resolution.response_type.clone();
        let handler = Arc::clone(resolution.registration.handler());

        let invocation = Invocation::new(resource.as_str(), verb, resolution.arguments)
            .with_payload(payload, resolution.content_type)
            .with_response_type(response_type.clone());

        // Polling inside catch_unwind also covers panics raised while the
        // handler builds its future.
        let outcome = AssertUnwindSafe(async move { handler.call(invocation).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(reply)) => Ok(respond(reply, response_type.as_ref())),
            Ok(Err(err)) => {
                let condition = match err.downcast::<Condition>() {
                    Ok(condition) => condition,
                    Err(other) => Condition::internal(other),
                };
                self.fail(condition, &resource, response_type.as_ref())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(resource = %resource, panic = %message, "handler panicked");
                if !self.dispatch.internal_errors.catches() {
                    record_condition(hermes_core::ConditionKind::InternalHandlerError.as_str());
                    resume_unwind(panic);
                }
                let condition = Condition::internal(anyhow::anyhow!("handler panicked: {message}"));
                self.fail(condition, &resource, response_type.as_ref())
            }
        }
    }

    fn fail(
        &self,
        condition: Condition,
        resource: &str,
        media: Option<&MediaType>,
    ) -> Result<OutboundResponse, Escalation> {
        let kind = condition.kind();
        record_condition(kind.as_str());

        let policy = if condition.is_internal() {
            warn!(resource, condition = kind.as_str(), error = %condition, "internal handler error");
            self.dispatch.internal_errors
        } else {
            debug!(resource, condition = kind.as_str(), status = condition.status_code().as_u16(), "condition raised");
            self.dispatch.conditions
        };

        if !policy.catches() {
            return Err(Escalation {
                resource: resource.to_string(),
                condition,
            });
        }

        let mut response = OutboundResponse::new(condition.status_code());

        let allowed = condition.allowed_verbs();
        if !allowed.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&allow_header(allowed)) {
                response.headers.insert(ALLOW, value);
            }
        }

        let context = ExplainContext {
            condition: &condition,
            resource: (resource != ROOT).then_some(resource),
            media,
            verbose: policy.is_verbose(),
        };
        let snapshot = self.registry.snapshot();

        if let Some(explanation) = self.explain.explain(snapshot.lattice(), &context) {
            return Ok(response.with_body(explanation.body, explanation.content_type));
        }

        if policy.is_verbose() {
            return Ok(verbose_body(response, &condition, media));
        }

        if let Some(payload) = condition.payload() {
            return Ok(response.with_body(payload.to_string(), Some("application/json".to_string())));
        }

        Ok(response)
    }
}

fn respond(reply: Reply, response_type: Option<&MediaType>) -> OutboundResponse {
    let (status, body, content_type) = reply.into_parts();
    let mut response = OutboundResponse::new(status);

    if !body.is_empty() {
        let content_type = content_type.or_else(|| response_type.map(ToString::to_string));
        response = response.with_body(body, content_type);
    } else if content_type.is_some() {
        response.content_type = content_type;
    }

    response
}

fn verbose_body(response: OutboundResponse, condition: &Condition, media: Option<&MediaType>) -> OutboundResponse {
    if media.is_some_and(MediaType::is_json) {
        let envelope = condition.to_envelope();
        match serde_json::to_vec(&envelope) {
            Ok(body) => return response.with_body(body, Some("application/json".to_string())),
            Err(err) => warn!(error = %err, "failed to serialize error envelope"),
        }
    }

    let mut text = condition.to_string();
    let mut source = std::error::Error::source(condition);
    while let Some(cause) = source {
        let line = cause.to_string();
        if !text.contains(&line) {
            text.push_str("\ncaused by: ");
            text.push_str(&line);
        }
        source = cause.source();
    }
    response.with_body(text, Some("text/plain; charset=utf-8".to_string()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builder for [`Engine`].
#[derive(Debug, Default)]
pub struct EngineBuilder {
    registry: Option<Arc<Registry>>,
    dispatch: DispatchConfig,
    explain: ExplainRegistry,
}

impl EngineBuilder {
    /// A builder with catch-all policies and an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder taking policies and the home resource from configuration.
    pub fn from_config(config: &HermesConfig) -> Self {
        Self {
            dispatch: config.dispatch.clone(),
            ..Self::default()
        }
    }

    /// Shares an existing registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Registers a handler at build time.
    #[must_use]
    pub fn register(self, resource: &str, registration: Registration) -> Self {
        let mut builder = self;
        builder
            .registry
            .get_or_insert_with(|| Arc::new(Registry::new()))
            .register(resource, registration);
        builder
    }

    /// Policy for explicit status conditions.
    #[must_use]
    pub fn conditions(mut self, policy: ErrorPolicy) -> Self {
        self.dispatch.conditions = policy;
        self
    }

    /// Policy for internal handler errors.
    #[must_use]
    pub fn internal_errors(mut self, policy: ErrorPolicy) -> Self {
        self.dispatch.internal_errors = policy;
        self
    }

    /// Resource that serves `/`.
    #[must_use]
    pub fn home_resource(mut self, resource: impl Into<String>) -> Self {
        self.dispatch.home_resource = Some(resource.into());
        self
    }

    /// Adds an explanation hook.
    #[must_use]
    pub fn explain<E: Explain>(mut self, key: ExplainKey, hook: E) -> Self {
        self.explain.add(key, hook);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> Engine {
        let registry = self.registry.unwrap_or_else(|| Arc::new(Registry::new()));
        Engine {
            resolver: Resolver::new(Arc::clone(&registry)),
            generator: PathGenerator::new(Arc::clone(&registry)),
            registry,
            dispatch: self.dispatch,
            explain: self.explain,
        }
    }
}
