//! # Hermes Engine
//!
//! Turns an [`InboundRequest`] into an [`OutboundResponse`]:
//!
//! 1. split the path into resource name and raw segments
//! 2. resolve against the registry (arity, argument decoding, verb, media)
//! 3. invoke the selected handler, catching errors and panics
//! 4. map any [`Condition`](hermes_core::Condition) to a status, an `Allow`
//!    header for 405, and a body from an explanation hook or the policy
//!
//! Failures split into two classes with independent
//! [`ErrorPolicy`](hermes_core::ErrorPolicy)s: explicit status conditions and
//! internal handler errors. Both default to terse, body-less responses.

#![doc(html_root_url = "https://docs.rs/hermes-engine/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod boundary;
mod engine;
pub mod explain;

pub use boundary::{InboundRequest, OutboundResponse};
pub use engine::{Engine, EngineBuilder, Escalation};
pub use explain::{Explain, ExplainContext, ExplainKey, ExplainRegistry, Explanation};
