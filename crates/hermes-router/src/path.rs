//! Request path splitting.

use hermes_codec::escape::decode_component;

/// A request path split into resource name and positional segments.
///
/// # Example
///
/// ```rust
/// use hermes_router::RequestPath;
///
/// let path = RequestPath::parse("/widget/42/");
/// assert_eq!(path.resource(), Some("widget"));
/// assert_eq!(path.segments(), &["42".to_string()]);
///
/// assert_eq!(RequestPath::parse("/").resource(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    resource: Option<String>,
    segments: Vec<String>,
}

impl RequestPath {
    /// Splits `path` (without query string).
    ///
    /// The resource name is percent-decoded; segments are kept raw for the
    /// resource codec. One trailing slash is ignored. An empty path names no
    /// resource.
    pub fn parse(path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Self {
                resource: None,
                segments: Vec::new(),
            };
        }

        let mut parts = trimmed.split('/');
        let name = parts.next().unwrap_or_default();
        let resource = decode_component(name, false).unwrap_or_else(|_| name.to_string());

        Self {
            resource: Some(resource),
            segments: parts.map(str::to_string).collect(),
        }
    }

    /// The resource name, or `None` for the root path.
    pub fn resource(&self) -> Option<&str> {
        self.resource.as_deref()
    }

    /// Raw positional segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Replaces a missing resource name with `home`.
    pub fn or_home(mut self, home: Option<&str>) -> Self {
        if self.resource.is_none() {
            self.resource = home.map(str::to_string);
        }
        self
    }

    /// Splits into resource name and segments.
    pub fn into_parts(self) -> (Option<String>, Vec<String>) {
        (self.resource, self.segments)
    }
}

/// Splits a request target into path and raw query string.
pub fn split_uri(target: &str) -> (&str, &str) {
    target.split_once('?').unwrap_or((target, ""))
}
