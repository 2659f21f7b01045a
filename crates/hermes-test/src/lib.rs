//! # Hermes Test
//!
//! In-memory testing for Hermes engines: requests go straight into
//! [`Engine::dispatch`](hermes_engine::Engine::dispatch), so every resolution
//! step, policy and explanation hook runs exactly as behind a real adapter.
//!
//! ```ignore
//! use hermes_test::TestClient;
//!
//! #[tokio::test]
//! async fn widget_rejects_bad_ids() {
//!     let client = TestClient::new(build_engine());
//!
//!     client.get("/widget/42").accept("text/html").send().await.assert_success();
//!     client.get("/widget/abc").send().await.assert_status_code(400).assert_no_body();
//!     client.delete("/widget/42").send().await.assert_allow(&["GET"]);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use response::TestResponse;
