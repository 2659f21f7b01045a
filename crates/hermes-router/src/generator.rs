//! Path generation: the inverse of resolution.
//!
//! The generator builds a URI for a resource from typed values, using the
//! resource's codec. It never resolves a request. It does apply the
//! resolver's decoding and ranking rules to the path it built, so that a
//! path is only returned when whichever registration claims it decodes the
//! same values back.

use std::cmp::Ordering;
use std::sync::Arc;

use hermes_codec::escape::encode_component;
use hermes_codec::Slot;
use hermes_core::{Arguments, MediaLattice, TypeSpec, Value};

use crate::error::GenerationError;
use crate::registration::Registration;
use crate::registry::{Registry, Resource};
use crate::resolver::{complete_arguments, decode_segments, rank};

/// Builds request paths from typed values.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use hermes_core::{Invocation, Reply, TypeSpec, Value};
/// use hermes_router::{PathGenerator, Registration, Registry};
///
/// let registry = Arc::new(Registry::new());
/// registry.register(
///     "widget",
///     Registration::builder()
///         .positional(TypeSpec::Integer)
///         .keyword_default("format", TypeSpec::Symbol, Value::symbol("short"))
///         .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::empty()) })
///         .build()
///         .unwrap(),
/// );
///
/// let generator = PathGenerator::new(registry);
/// assert_eq!(generator.generate("widget", &[Value::Integer(42)], &[]).unwrap(), "/widget/42");
/// assert_eq!(
///     generator
///         .generate("widget", &[Value::Integer(42)], &[("format", Value::symbol("long"))])
///         .unwrap(),
///     "/widget/42?format=long"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PathGenerator {
    registry: Arc<Registry>,
}

impl PathGenerator {
    /// Creates a generator over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Generates a path for `resource` from positional and keyword values.
    ///
    /// Registrations are tried in registration order, each first with the
    /// codec's encoding for the declared specializers and then with the
    /// untyped encoding (a quoted string instead of a bare word). A path is
    /// accepted once every other registration that could win it, under some
    /// verb and accept header, decodes it to the same arguments. Keywords
    /// equal to their registration default are left out of the query string.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Ambiguous`] when no encodable path decodes
    /// back to the values, e.g. an integer for a resource that also takes a
    /// float at that position.
    pub fn generate(
        &self,
        resource: &str,
        positional: &[Value],
        keywords: &[(&str, Value)],
    ) -> Result<String, GenerationError> {
        for (index, (name, _)) in keywords.iter().enumerate() {
            if keywords[..index].iter().any(|(n, _)| n == name) {
                return Err(GenerationError::DuplicateKeyword((*name).to_string()));
            }
        }

        let snapshot = self.registry.snapshot();
        let res = snapshot
            .resource(resource)
            .ok_or_else(|| GenerationError::UnknownResource(resource.to_string()))?;

        let admitting: Vec<&Arc<Registration>> = res
            .registrations()
            .iter()
            .filter(|r| r.admits(positional.len()))
            .collect();

        let mut first_error = None;
        let mut ambiguous = false;
        for target in &admitting {
            let mut tried: Option<Generated> = None;
            for encoding in [Encoding::Declared, Encoding::Untyped] {
                let generated = match build(res, target, positional, keywords, encoding) {
                    Ok(generated) => generated,
                    Err(err) => {
                        first_error.get_or_insert(err);
                        break;
                    }
                };
                if tried.as_ref() == Some(&generated) {
                    continue;
                }

                let check = Check {
                    res,
                    lattice: snapshot.lattice(),
                    target,
                    admitting: &admitting,
                };
                if check.resolves_back(&generated, positional, keywords) {
                    return Ok(generated.into_path(res));
                }
                ambiguous = true;
                tried = Some(generated);
            }
        }

        if ambiguous {
            return Err(GenerationError::Ambiguous {
                resource: resource.to_string(),
            });
        }
        Err(first_error.unwrap_or_else(|| GenerationError::NoMatchingShape {
            resource: resource.to_string(),
            count: positional.len(),
        }))
    }

    /// Generates a path from an [`Arguments`] set.
    pub fn generate_arguments(&self, resource: &str, arguments: &Arguments) -> Result<String, GenerationError> {
        let keywords: Vec<(&str, Value)> = arguments
            .keywords()
            .map(|(name, value)| (name, value.clone()))
            .collect();
        self.generate(resource, arguments.positionals(), &keywords)
    }
}

#[derive(Debug, Clone, Copy)]
enum Encoding {
    /// Encode against the registration's own specializers.
    Declared,
    /// Encode as if every slot were `Any`.
    Untyped,
}

impl Encoding {
    fn spec(self, declared: Option<&TypeSpec>) -> TypeSpec {
        match self {
            Self::Declared => declared.cloned().unwrap_or_default(),
            Self::Untyped => TypeSpec::Any,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Generated {
    segments: Vec<String>,
    query: String,
}

impl Generated {
    fn into_path(self, res: &Resource) -> String {
        let mut path = format!("/{}", encode_component(res.name()));
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        if !self.query.is_empty() {
            path.push('?');
            path.push_str(&self.query);
        }
        path
    }
}

struct Check<'a> {
    res: &'a Resource,
    lattice: &'a MediaLattice,
    target: &'a Arc<Registration>,
    admitting: &'a [&'a Arc<Registration>],
}

impl Check<'_> {
    /// The target must decode the original values, and no other
    /// registration that could win the path may decode anything else.
    fn resolves_back(&self, generated: &Generated, positional: &[Value], keywords: &[(&str, Value)]) -> bool {
        let count = generated.segments.len();
        let expected = decode_segments(self.res, self.target, &generated.segments)
            .ok()
            .and_then(|decoded| complete_arguments(self.res, self.target, decoded, &generated.query).ok());
        let Some(expected) = expected else {
            return false;
        };
        if expected.positionals().get(..count) != Some(positional)
            || keywords.iter().any(|(name, value)| expected.keyword(name) != Some(value))
        {
            return false;
        }

        !self
            .admitting
            .iter()
            .filter(|&&competitor| !Arc::ptr_eq(competitor, self.target))
            .any(|competitor| self.contests(competitor, generated, &expected))
    }

    /// A competitor contests the path when it can be selected for the same
    /// request and decodes something other than `expected`.
    fn contests(&self, competitor: &Registration, generated: &Generated, expected: &Arguments) -> bool {
        if !competitor.verb().overlaps(self.target.verb()) {
            return false;
        }
        let Ok(decoded) = decode_segments(self.res, competitor, &generated.segments) else {
            return false;
        };

        // Equivalent media score identically for every request, so the
        // static ranking alone decides between the two.
        let can_win = !self.lattice.equivalent(competitor.media(), self.target.media())
            || rank(competitor, self.target, generated.segments.len()) == Ordering::Greater;
        if !can_win {
            return false;
        }

        !complete_arguments(self.res, competitor, decoded, &generated.query)
            .is_ok_and(|arguments| same_arguments(&arguments, expected))
    }
}

fn same_arguments(a: &Arguments, b: &Arguments) -> bool {
    a.positionals() == b.positionals()
        && a.keyword_len() == b.keyword_len()
        && a.keywords().all(|(name, value)| b.keyword(name) == Some(value))
}

fn build(
    res: &Resource,
    registration: &Registration,
    positional: &[Value],
    keywords: &[(&str, Value)],
    encoding: Encoding,
) -> Result<Generated, GenerationError> {
    let unknown = |keyword: &str| GenerationError::UnknownKeyword {
        resource: res.name().to_string(),
        keyword: keyword.to_string(),
    };

    if let Some((name, _)) = keywords.iter().find(|(n, _)| registration.keyword(n).is_none()) {
        return Err(unknown(name));
    }
    if let Some(missing) = registration
        .keywords()
        .iter()
        .find(|k| k.is_required() && !keywords.iter().any(|(n, _)| *n == k.name))
    {
        return Err(GenerationError::MissingKeyword {
            resource: res.name().to_string(),
            keyword: missing.name.clone(),
        });
    }

    let codec = res.codec();
    let segments = positional
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let spec = encoding.spec(registration.positional_spec(index));
            codec.encode(value, Slot::Positional(index), &spec)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut query = String::new();
    for keyword in registration.keywords() {
        let Some((_, value)) = keywords.iter().find(|(n, _)| *n == keyword.name) else {
            continue;
        };
        if keyword.default.as_ref() == Some(value) {
            continue;
        }
        let spec = encoding.spec(Some(&keyword.spec));
        let encoded = codec.encode(value, Slot::Keyword(&keyword.name), &spec)?;
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&encode_component(&keyword.name));
        query.push('=');
        query.push_str(&encoded);
    }

    Ok(Generated { segments, query })
}
