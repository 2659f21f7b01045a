//! Handler registrations and their signatures.

use std::fmt;
use std::sync::Arc;

use hermes_core::{Handler, MediaType, SharedHandler, TypeSpec, Value};
use http::Method;

use crate::error::RegistrationError;
use crate::verb::VerbSpec;

/// The identity of a registration within its resource.
///
/// Registering a second handler with an equal signature replaces the first.
/// Keywords are not part of the signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Verb specializer.
    pub verb: VerbSpec,
    /// Media type specializer.
    pub media: MediaType,
    /// Required positional specializers.
    pub required: Vec<TypeSpec>,
    /// Optional positional specializers.
    pub optional: Vec<TypeSpec>,
    /// Specializer for any number of trailing positionals.
    pub rest: Option<TypeSpec>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (", self.verb, self.media)?;
        let mut sep = "";
        for spec in &self.required {
            write!(f, "{sep}{spec}")?;
            sep = " ";
        }
        for spec in &self.optional {
            write!(f, "{sep}[{spec}]")?;
            sep = " ";
        }
        if let Some(rest) = &self.rest {
            write!(f, "{sep}{rest}...")?;
        }
        f.write_str(")")
    }
}

/// A keyword parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSpec {
    /// Name as it appears in the query string (case-sensitive).
    pub name: String,
    /// Specializer for the value.
    pub spec: TypeSpec,
    /// Value used when the keyword is absent; `None` makes it required.
    pub default: Option<Value>,
}

impl KeywordSpec {
    /// Returns `true` if the keyword has no default.
    pub const fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// One handler registered on a resource.
pub struct Registration {
    signature: Signature,
    defaults: Vec<Value>,
    keywords: Vec<KeywordSpec>,
    handler: SharedHandler,
    sequence: u64,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("signature", &self.signature)
            .field("keywords", &self.keywords)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Starts building a registration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_core::{Invocation, Reply, TypeSpec, Value};
    /// use hermes_router::Registration;
    /// use http::Method;
    ///
    /// let registration = Registration::builder()
    ///     .verb(Method::GET)
    ///     .media("text/html")
    ///     .positional(TypeSpec::Integer)
    ///     .keyword_default("format", TypeSpec::Symbol, Value::symbol("short"))
    ///     .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::text("widget")) })
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(registration.admits(1));
    /// assert!(!registration.admits(2));
    /// ```
    pub fn builder() -> RegistrationBuilder {
        RegistrationBuilder::default()
    }

    /// The registration's signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Verb specializer.
    pub fn verb(&self) -> &VerbSpec {
        &self.signature.verb
    }

    /// Media type specializer.
    pub fn media(&self) -> &MediaType {
        &self.signature.media
    }

    /// Declared keywords in declaration order.
    pub fn keywords(&self) -> &[KeywordSpec] {
        &self.keywords
    }

    /// Looks up a declared keyword.
    pub fn keyword(&self, name: &str) -> Option<&KeywordSpec> {
        self.keywords.iter().find(|k| k.name == name)
    }

    /// The handler body.
    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    /// Registration order, used as the final tie-breaker.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn set_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }

    /// Returns `true` if the registration takes `count` positional segments.
    pub fn admits(&self, count: usize) -> bool {
        let required = self.signature.required.len();
        let max = required + self.signature.optional.len();
        count >= required && (count <= max || self.signature.rest.is_some())
    }

    /// Specializer for the positional at `index`.
    pub fn positional_spec(&self, index: usize) -> Option<&TypeSpec> {
        let sig = &self.signature;
        let optional_start = sig.required.len();
        let rest_start = optional_start + sig.optional.len();
        if index < optional_start {
            sig.required.get(index)
        } else if index < rest_start {
            sig.optional.get(index - optional_start)
        } else {
            sig.rest.as_ref()
        }
    }

    /// Defaults for optional positionals not present among the first `count`.
    pub fn missing_defaults(&self, count: usize) -> &[Value] {
        let skip = count.saturating_sub(self.signature.required.len());
        self.defaults.get(skip..).unwrap_or_default()
    }

    /// Summed specificity of the specializers for the first `count` positionals.
    pub fn positional_specificity(&self, count: usize) -> u32 {
        (0..count)
            .filter_map(|i| self.positional_spec(i))
            .map(|spec| u32::from(spec.specificity()))
            .sum()
    }
}

/// Fluent builder for [`Registration`].
#[derive(Default)]
pub struct RegistrationBuilder {
    verb: VerbSpec,
    media: Option<Result<MediaType, RegistrationError>>,
    required: Vec<TypeSpec>,
    optional: Vec<(TypeSpec, Value)>,
    rest: Option<TypeSpec>,
    keywords: Vec<KeywordSpec>,
    handler: Option<SharedHandler>,
}

impl RegistrationBuilder {
    /// Accepts only `verb`.
    pub fn verb(mut self, verb: Method) -> Self {
        self.verb = VerbSpec::Exact(verb);
        self
    }

    /// Accepts every verb (the default).
    pub fn any_verb(mut self) -> Self {
        self.verb = VerbSpec::Any;
        self
    }

    /// Sets the media type specializer; defaults to `*/*`.
    pub fn media(mut self, media: &str) -> Self {
        self.media = Some(media.parse().map_err(RegistrationError::from));
        self
    }

    /// Sets an already-parsed media type specializer.
    pub fn media_type(mut self, media: MediaType) -> Self {
        self.media = Some(Ok(media));
        self
    }

    /// Appends a required positional parameter.
    pub fn positional(mut self, spec: TypeSpec) -> Self {
        self.required.push(spec);
        self
    }

    /// Appends an optional positional parameter.
    pub fn optional(mut self, spec: TypeSpec, default: impl Into<Value>) -> Self {
        self.optional.push((spec, default.into()));
        self
    }

    /// Accepts any number of trailing positionals.
    pub fn rest(mut self, spec: TypeSpec) -> Self {
        self.rest = Some(spec);
        self
    }

    /// Declares a required keyword.
    pub fn keyword(mut self, name: impl Into<String>, spec: TypeSpec) -> Self {
        self.keywords.push(KeywordSpec {
            name: name.into(),
            spec,
            default: None,
        });
        self
    }

    /// Declares a keyword with a default value.
    pub fn keyword_default(
        mut self,
        name: impl Into<String>,
        spec: TypeSpec,
        default: impl Into<Value>,
    ) -> Self {
        self.keywords.push(KeywordSpec {
            name: name.into(),
            spec,
            default: Some(default.into()),
        });
        self
    }

    /// Sets the handler body.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Sets an already-shared handler body.
    pub fn shared_handler(mut self, handler: SharedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Validates and builds the registration.
    pub fn build(self) -> Result<Registration, RegistrationError> {
        let media = self.media.transpose()?.unwrap_or_else(MediaType::any);
        let handler = self.handler.ok_or(RegistrationError::MissingHandler)?;

        for (index, (spec, default)) in self.optional.iter().enumerate() {
            if !spec.accepts(default) {
                return Err(RegistrationError::DefaultMismatch {
                    slot: format!("optional positional {}", self.required.len() + index),
                    expected: spec.to_string(),
                });
            }
        }

        for (index, keyword) in self.keywords.iter().enumerate() {
            if keyword.name.is_empty() {
                return Err(RegistrationError::EmptyKeyword);
            }
            if self.keywords[..index].iter().any(|k| k.name == keyword.name) {
                return Err(RegistrationError::DuplicateKeyword(keyword.name.clone()));
            }
            if let Some(default) = &keyword.default {
                if !keyword.spec.accepts(default) {
                    return Err(RegistrationError::DefaultMismatch {
                        slot: format!("keyword '{}'", keyword.name),
                        expected: keyword.spec.to_string(),
                    });
                }
            }
        }

        let (optional, defaults) = self.optional.into_iter().unzip();

        Ok(Registration {
            signature: Signature {
                verb: self.verb,
                media,
                required: self.required,
                optional,
                rest: self.rest,
            },
            defaults,
            keywords: self.keywords,
            handler,
            sequence: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Invocation, Reply};

    async fn noop(_inv: Invocation) -> anyhow::Result<Reply> {
        Ok(Reply::empty())
    }

    #[test]
    fn test_arity() {
        let reg = Registration::builder()
            .positional(TypeSpec::Integer)
            .optional(TypeSpec::Symbol, Value::symbol("short"))
            .handler(noop)
            .build()
            .unwrap();

        assert!(!reg.admits(0));
        assert!(reg.admits(1));
        assert!(reg.admits(2));
        assert!(!reg.admits(3));
        assert_eq!(reg.missing_defaults(1), &[Value::symbol("short")]);
        assert!(reg.missing_defaults(2).is_empty());
    }

    #[test]
    fn test_rest_admits_any_tail() {
        let reg = Registration::builder()
            .positional(TypeSpec::Any)
            .rest(TypeSpec::Integer)
            .handler(noop)
            .build()
            .unwrap();

        assert!(reg.admits(1));
        assert!(reg.admits(9));
        assert_eq!(reg.positional_spec(0), Some(&TypeSpec::Any));
        assert_eq!(reg.positional_spec(5), Some(&TypeSpec::Integer));
        assert_eq!(reg.positional_specificity(3), 4);
    }

    #[test]
    fn test_defaults() {
        let reg = Registration::builder().handler(noop).build().unwrap();
        assert_eq!(reg.verb(), &VerbSpec::Any);
        assert_eq!(reg.media(), &MediaType::any());
        assert!(reg.admits(0));
        assert!(!reg.admits(1));
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            Registration::builder().build(),
            Err(RegistrationError::MissingHandler)
        ));
        assert!(matches!(
            Registration::builder().media("not a type").handler(noop).build(),
            Err(RegistrationError::InvalidMediaType(_))
        ));
        assert!(matches!(
            Registration::builder()
                .keyword("a", TypeSpec::Any)
                .keyword("a", TypeSpec::Any)
                .handler(noop)
                .build(),
            Err(RegistrationError::DuplicateKeyword(name)) if name == "a"
        ));
        assert!(matches!(
            Registration::builder()
                .keyword_default("page", TypeSpec::Integer, Value::symbol("one"))
                .handler(noop)
                .build(),
            Err(RegistrationError::DefaultMismatch { .. })
        ));
    }

    #[test]
    fn test_signature_display() {
        let reg = Registration::builder()
            .verb(Method::GET)
            .media("text/html")
            .positional(TypeSpec::Integer)
            .optional(TypeSpec::Symbol, Value::symbol("x"))
            .rest(TypeSpec::Any)
            .handler(noop)
            .build()
            .unwrap();
        assert_eq!(
            reg.signature().to_string(),
            "GET text/html (integer [symbol] any...)"
        );
    }
}
