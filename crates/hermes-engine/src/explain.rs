//! Explanation hooks: response bodies for caught conditions.
//!
//! A hook is registered under an [`ExplainKey`] naming any subset of
//! condition kind, resource and response media type. For a caught condition
//! the most specific matching key wins: more named fields first, then the
//! more specific media range. Ties go to the hook registered first.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{Condition, ConditionKind, MediaLattice, MediaType};

/// What a hook sees when asked to explain a condition.
#[derive(Debug, Clone, Copy)]
pub struct ExplainContext<'a> {
    /// The condition being answered.
    pub condition: &'a Condition,
    /// Resource name, if the path named one.
    pub resource: Option<&'a str>,
    /// Negotiated (or preferred) response media type.
    pub media: Option<&'a MediaType>,
    /// Whether the active policy asks for diagnostic detail.
    pub verbose: bool,
}

/// A response body produced by a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    /// Body bytes.
    pub body: Bytes,
    /// Body content type.
    pub content_type: Option<String>,
}

impl Explanation {
    /// A `text/plain` explanation.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: Bytes::from(body.into()),
            content_type: Some("text/plain; charset=utf-8".to_string()),
        }
    }

    /// An `application/json` explanation.
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            body: Bytes::from(value.to_string()),
            content_type: Some("application/json".to_string()),
        }
    }

    /// A body with an explicit content type.
    pub fn with_type(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.into()),
        }
    }
}

/// Produces a response body for a caught condition.
pub trait Explain: Send + Sync + 'static {
    /// Renders the explanation.
    fn explain(&self, context: &ExplainContext<'_>) -> Explanation;
}

impl<F> Explain for F
where
    F: Fn(&ExplainContext<'_>) -> Explanation + Send + Sync + 'static,
{
    fn explain(&self, context: &ExplainContext<'_>) -> Explanation {
        self(context)
    }
}

/// Which conditions a hook answers. Unset fields match anything.
///
/// ```rust
/// use hermes_core::{ConditionKind, MediaType};
/// use hermes_engine::ExplainKey;
///
/// let key = ExplainKey::any()
///     .kind(ConditionKind::ResourceUnknown)
///     .media("text/html".parse::<MediaType>().unwrap());
/// assert_eq!(key.specificity(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplainKey {
    kind: Option<ConditionKind>,
    resource: Option<String>,
    media: Option<MediaType>,
}

impl ExplainKey {
    /// Matches every condition.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts to one condition kind.
    #[must_use]
    pub fn kind(mut self, kind: ConditionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to one resource.
    #[must_use]
    pub fn resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Restricts to response types within a media range.
    #[must_use]
    pub fn media(mut self, media: MediaType) -> Self {
        self.media = Some(media);
        self
    }

    /// Number of fields this key names.
    pub fn specificity(&self) -> usize {
        usize::from(self.kind.is_some())
            + usize::from(self.resource.is_some())
            + usize::from(self.media.is_some())
    }

    fn media_rank(&self) -> u8 {
        self.media.as_ref().map_or(0, |m| m.specificity().rank())
    }

    fn matches(&self, lattice: &MediaLattice, context: &ExplainContext<'_>) -> bool {
        if self.kind.is_some_and(|k| k != context.condition.kind()) {
            return false;
        }
        if let Some(resource) = &self.resource {
            if context.resource != Some(resource.as_str()) {
                return false;
            }
        }
        match (&self.media, context.media) {
            (None, _) => true,
            (Some(range), Some(media)) => lattice.contains(range, media),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for ExplainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.map_or("*", ConditionKind::as_str);
        let resource = self.resource.as_deref().unwrap_or("*");
        match &self.media {
            Some(media) => write!(f, "{kind}/{resource}/{media}"),
            None => write!(f, "{kind}/{resource}/*"),
        }
    }
}

/// Ordered set of explanation hooks.
#[derive(Clone, Default)]
pub struct ExplainRegistry {
    rules: Vec<(ExplainKey, Arc<dyn Explain>)>,
}

impl ExplainRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hook. An identical key registered earlier keeps precedence.
    pub fn add<E: Explain>(&mut self, key: ExplainKey, hook: E) {
        self.rules.push((key, Arc::new(hook)));
    }

    /// Number of hooks.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Finds the most specific hook for `context`.
    pub fn find(&self, lattice: &MediaLattice, context: &ExplainContext<'_>) -> Option<&Arc<dyn Explain>> {
        let mut best: Option<&(ExplainKey, Arc<dyn Explain>)> = None;

        for rule in self.rules.iter().filter(|(key, _)| key.matches(lattice, context)) {
            let better = match best {
                None => true,
                Some((current, _)) => {
                    (rule.0.specificity(), rule.0.media_rank())
                        > (current.specificity(), current.media_rank())
                }
            };
            if better {
                best = Some(rule);
            }
        }

        best.map(|(_, hook)| hook)
    }

    /// Runs the most specific hook for `context`, if any.
    pub fn explain(&self, lattice: &MediaLattice, context: &ExplainContext<'_>) -> Option<Explanation> {
        self.find(lattice, context).map(|hook| hook.explain(context))
    }
}

impl fmt::Debug for ExplainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(key, _)| key.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn media(s: &str) -> MediaType {
        s.parse().unwrap()
    }

    fn fixed(body: &'static str) -> impl Fn(&ExplainContext<'_>) -> Explanation {
        move |_: &ExplainContext<'_>| Explanation::text(body)
    }

    fn context<'a>(condition: &'a Condition, resource: &'a str, media: Option<&'a MediaType>) -> ExplainContext<'a> {
        ExplainContext {
            condition,
            resource: Some(resource),
            media,
            verbose: false,
        }
    }

    fn explained(registry: &ExplainRegistry, ctx: &ExplainContext<'_>) -> Option<Bytes> {
        registry.explain(&MediaLattice::new(), ctx).map(|e| e.body)
    }

    #[test]
    fn test_empty_registry() {
        let registry = ExplainRegistry::new();
        let condition = Condition::resource_unknown("x");
        assert!(registry.is_empty());
        assert!(explained(&registry, &context(&condition, "x", None)).is_none());
    }

    #[test]
    fn test_most_specific_wins() {
        let mut registry = ExplainRegistry::new();
        registry.add(ExplainKey::any(), fixed("any"));
        registry.add(ExplainKey::any().kind(ConditionKind::Status), fixed("kind"));
        registry.add(
            ExplainKey::any().kind(ConditionKind::Status).resource("widget"),
            fixed("kind+resource"),
        );

        let condition = Condition::status(StatusCode::CONFLICT);
        let html = media("text/html");

        assert_eq!(
            explained(&registry, &context(&condition, "widget", Some(&html))).unwrap(),
            "kind+resource"
        );
        assert_eq!(
            explained(&registry, &context(&condition, "gadget", Some(&html))).unwrap(),
            "kind"
        );

        let other = Condition::resource_unknown("gadget");
        assert_eq!(explained(&registry, &context(&other, "gadget", None)).unwrap(), "any");
    }

    #[test]
    fn test_media_range_specificity() {
        let mut registry = ExplainRegistry::new();
        registry.add(ExplainKey::any().media(media("text/*")), fixed("text"));
        registry.add(ExplainKey::any().media(media("text/html")), fixed("html"));

        let condition = Condition::resource_unknown("x");
        let html = media("text/html");
        let plain = media("text/plain");
        let json = media("application/json");

        assert_eq!(explained(&registry, &context(&condition, "x", Some(&html))).unwrap(), "html");
        assert_eq!(explained(&registry, &context(&condition, "x", Some(&plain))).unwrap(), "text");
        assert!(explained(&registry, &context(&condition, "x", Some(&json))).is_none());
        assert!(explained(&registry, &context(&condition, "x", None)).is_none());
    }

    #[test]
    fn test_ties_go_to_first_registered() {
        let mut registry = ExplainRegistry::new();
        registry.add(ExplainKey::any().resource("x"), fixed("first"));
        registry.add(ExplainKey::any().resource("x"), fixed("second"));

        let condition = Condition::resource_unknown("x");
        assert_eq!(explained(&registry, &context(&condition, "x", None)).unwrap(), "first");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_key_display() {
        let key = ExplainKey::any().kind(ConditionKind::VerbNotAllowed).resource("doc");
        assert_eq!(key.to_string(), "verb_not_allowed/doc/*");
    }
}
