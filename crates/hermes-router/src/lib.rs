//! # Hermes Router
//!
//! Resource registry, dispatch resolver and path generator.
//!
//! Requests are addressed as `/<resource>/<seg>.../?k=v&...`. Each resource
//! holds any number of [`Registration`]s that differ by verb, media type and
//! positional shape. The [`Resolver`] picks the one registration that best
//! fits a request, and the [`PathGenerator`] runs the other way, building a
//! path that resolves back to the given values.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hermes_core::{Invocation, Reply, TypeSpec, Value};
//! use hermes_router::{PathGenerator, Registration, Registry, RequestPath, RequestTriple, Resolver};
//! use http::Method;
//!
//! let registry = Arc::new(Registry::new());
//! registry.register(
//!     "widget",
//!     Registration::builder()
//!         .verb(Method::GET)
//!         .media("text/html")
//!         .positional(TypeSpec::Integer)
//!         .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::text("widget")) })
//!         .build()
//!         .unwrap(),
//! );
//!
//! let path = PathGenerator::new(Arc::clone(&registry))
//!     .generate("widget", &[Value::Integer(42)], &[])
//!     .unwrap();
//! let (resource, segments) = RequestPath::parse(&path).into_parts();
//!
//! let resolution = Resolver::new(registry)
//!     .resolve(&resource.unwrap(), &RequestTriple::new(Method::GET, segments))
//!     .unwrap();
//! assert_eq!(resolution.arguments.positional(0), Some(&Value::Integer(42)));
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod generator;
mod path;
mod registration;
mod registry;
mod resolver;
mod verb;

pub use error::{GenerationError, RegistrationError};
pub use generator::PathGenerator;
pub use path::{split_uri, RequestPath};
pub use registration::{KeywordSpec, Registration, RegistrationBuilder, Signature};
pub use registry::{Registry, Resource, Snapshot};
pub use resolver::{RequestTriple, Resolution, Resolver};
pub use verb::{allow_header, carries_body, sort_verbs, VerbSpec};
