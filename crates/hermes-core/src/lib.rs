//! # Hermes Core
//!
//! Core types shared by every Hermes crate:
//!
//! - [`media`] - media types, the specificity lattice and `Accept` negotiation
//! - [`Value`] / [`TypeSpec`] - typed URI arguments and their specializers
//! - [`Arguments`] - decoded positional and keyword arguments
//! - [`Condition`] - status-bearing failures and their [`ErrorPolicy`]
//! - [`Handler`] - the async handler trait, with [`Invocation`] and [`Reply`]

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod args;
mod condition;
mod handler;
pub mod media;
mod value;

pub use args::Arguments;
pub use condition::{
    Condition, ConditionKind, ConditionResult, ErrorDetail, ErrorEnvelope, ErrorPolicy,
    InvalidStatus,
};
pub use handler::{BoxedReply, Handler, Invocation, Reply, SharedHandler};
pub use media::{AcceptList, MediaLattice, MediaType, MediaTypeError, Specificity};
pub use value::{TypeSpec, Value};
