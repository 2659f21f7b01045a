//! Test response wrapper.

use std::fmt;

use bytes::Bytes;
use hermes_engine::OutboundResponse;
use http::header::{HeaderMap, HeaderValue, ALLOW};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// An [`OutboundResponse`] with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    content_type: Option<String>,
    body: Option<Bytes>,
}

impl From<OutboundResponse> for TestResponse {
    fn from(response: OutboundResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            content_type: response.content_type,
            body: response.body,
        }
    }
}

impl TestResponse {
    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns true for 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true for 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Extra response headers (the content type is kept separately).
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// Verbs listed in the `Allow` header, in order.
    #[must_use]
    pub fn allowed_verbs(&self) -> Vec<&str> {
        self.headers
            .get(ALLOW)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// The response content type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns true if the response carries a body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// The body, empty when absent.
    #[must_use]
    pub fn body(&self) -> Bytes {
        self.body.clone().unwrap_or_default()
    }

    /// The body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body().to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| TestError::BodyRead("response has no body".to_string()))?;
        Ok(serde_json::from_slice(body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} (body: {:?})",
            expected,
            self.status,
            self.text().ok()
        );
        self
    }

    /// Asserts the status code as a u16.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.status.as_u16()
        );
        self
    }

    /// Asserts a 2xx status.
    ///
    /// # Panics
    ///
    /// Panics if the status is not 2xx.
    pub fn assert_success(&self) -> &Self {
        assert!(self.is_success(), "Expected success status, got {}", self.status);
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let expected = expected.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("Header '{name}' not found"));
        assert_eq!(actual, expected, "Header '{name}': expected '{expected}', got '{actual}'");
        self
    }

    /// Asserts the `Allow` header lists exactly these verbs, in order.
    ///
    /// # Panics
    ///
    /// Panics if the lists differ.
    pub fn assert_allow(&self, expected: &[&str]) -> &Self {
        assert_eq!(self.allowed_verbs(), expected, "Allow header mismatch");
        self
    }

    /// Asserts the content type starts with `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the content type is missing or differs.
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let actual = self.content_type().expect("Content-Type not set");
        assert!(
            actual.starts_with(expected),
            "Content-Type: expected '{expected}', got '{actual}'"
        );
        self
    }

    /// Asserts a bare-status response.
    ///
    /// # Panics
    ///
    /// Panics if a body is present.
    pub fn assert_no_body(&self) -> &Self {
        assert!(
            self.body.is_none(),
            "Expected no body, got {:?}",
            self.text().ok()
        );
        self
    }

    /// Asserts the body contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't contain the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = self.text().expect("Body should be valid UTF-8");
        assert!(body.contains(expected), "Body should contain '{expected}', got: {body}");
        self
    }

    /// Asserts the body equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body doesn't match.
    pub fn assert_body_eq(&self, expected: impl AsRef<str>) -> &Self {
        let body = self.text().expect("Body should be valid UTF-8");
        assert_eq!(body, expected.as_ref(), "Body mismatch");
        self
    }

    /// Asserts a field of the JSON body, addressed by a dotted path.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON or the field is missing or differs.
    pub fn assert_json_field(&self, path: impl AsRef<str>, expected: &serde_json::Value) -> &Self {
        let path = path.as_ref();
        let json = self.json_value().expect("Body should be valid JSON");
        let actual = json_path(&json, path)
            .unwrap_or_else(|| panic!("JSON path '{path}' not found in: {json}"));
        assert_eq!(actual, expected, "JSON field '{path}'");
        self
    }
}

fn json_path<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(json, |node, key| match key.parse::<usize>() {
        Ok(index) => node.get(index),
        Err(_) => node.get(key),
    })
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("body", &self.text().ok())
            .finish()
    }
}
