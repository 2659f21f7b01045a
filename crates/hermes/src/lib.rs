//! # Hermes
//!
//! Request dispatch for web applications whose handlers are selected by
//! resource name, verb, media type and the types of their path arguments.
//!
//! - **Resources, not routes**: `/<resource>/<seg>...?k=v` with each segment
//!   decoded by a per-resource [`ArgumentCodec`](codec::ArgumentCodec)
//! - **Content negotiation**: `Accept` and `Content-Type` pick between
//!   handlers registered under different media types
//! - **Reversible paths**: the path generator builds URIs that resolve back
//!   to the values they were generated from
//! - **Terse by default**: failures map to bare status responses unless a
//!   policy or explanation hook opts in to detail
//!
//! ## Quick Start
//!
//! ```rust
//! use hermes::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let config = ConfigLoader::new().with_development().load().unwrap();
//! let engine = EngineBuilder::from_config(&config)
//!     .register(
//!         "widget",
//!         Registration::builder()
//!             .verb(Method::GET)
//!             .media("text/html")
//!             .positional(TypeSpec::Integer)
//!             .handler(|inv: Invocation| async move {
//!                 let id = inv.arguments().positional(0).cloned().unwrap_or(Value::Integer(0));
//!                 Ok::<_, anyhow::Error>(Reply::ok(format!("<h1>widget {id}</h1>")))
//!             })
//!             .build()
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let link = engine.generate("widget", &[Value::Integer(42)], &[]).unwrap();
//! let response = engine.dispatch(InboundRequest::new(Method::GET, &link)).await.unwrap();
//! assert_eq!(response.status, StatusCode::OK);
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! InboundRequest → path split → Resolver (arity → decode → verb → media → keywords)
//!                                   ↓
//! OutboundResponse ← condition mapping ← handler invocation
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Media types, values, conditions and the handler contract.
pub use hermes_core as core;

/// URI argument codecs.
pub use hermes_codec as codec;

/// Registry, resolver and path generator.
pub use hermes_router as router;

/// Dispatch engine and explanation hooks.
pub use hermes_engine as engine;

/// Layered configuration.
pub use hermes_config as config;

/// Logging and metrics.
pub use hermes_telemetry as telemetry;

/// Common imports for applications.
///
/// ```rust
/// use hermes::prelude::*;
///
/// let engine = Engine::builder().conditions(ErrorPolicy::Verbose).build();
/// assert!(engine.registry().resources().is_empty());
/// ```
pub mod prelude {
    pub use hermes_core::{
        Arguments, Condition, ConditionKind, ErrorPolicy, Invocation, MediaType, Reply, TypeSpec,
        Value,
    };

    pub use hermes_codec::{ArgumentCodec, DefaultCodec};

    pub use hermes_router::{PathGenerator, Registration, Registry};

    pub use hermes_engine::{
        Engine, EngineBuilder, Escalation, ExplainContext, ExplainKey, Explanation, InboundRequest,
        OutboundResponse,
    };

    pub use hermes_config::{ConfigLoader, HermesConfig};

    pub use hermes_telemetry::{init_telemetry, TelemetryConfig};

    pub use http::{Method, StatusCode};
}
