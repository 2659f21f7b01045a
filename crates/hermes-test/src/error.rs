//! Test error types.

use hermes_engine::Escalation;
use thiserror::Error;

/// Errors that can occur while sending a test request.
#[derive(Debug, Error)]
pub enum TestError {
    /// The engine let a condition escape under a propagating policy.
    #[error("dispatch escalated: {0}")]
    Escalated(#[from] Escalation),

    /// The response body is not what the caller expected.
    #[error("body read error: {0}")]
    BodyRead(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
