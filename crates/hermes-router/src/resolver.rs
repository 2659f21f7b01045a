//! Dispatch resolution.
//!
//! Given a resource name and a request, the resolver picks exactly one
//! registration or explains why none applies:
//!
//! 1. the resource must exist (404);
//! 2. some registration must take the number of segments (404), and decode
//!    them (400);
//! 3. some decoded candidate must accept the verb (405);
//! 4. some remaining candidate must accept the payload type for `POST`,
//!    `PUT` and `PATCH` (415), or satisfy `Accept` for other verbs (406);
//! 5. the best-scoring candidate wins, with ties going to more specific
//!    positional specializers, then a more specific media type, then the
//!    earlier registration;
//! 6. the query string must match the winner's keywords (400).

use std::cmp::Ordering;
use std::sync::Arc;

use hermes_codec::escape::decode_component;
use hermes_codec::{ArgumentError, Slot};
use hermes_core::{AcceptList, Arguments, Condition, MediaLattice, MediaType, Value};
use http::Method;
use smallvec::SmallVec;
use tracing::debug;

use crate::registration::Registration;
use crate::registry::{Registry, Resource};
use crate::verb::{carries_body, sort_verbs};

/// The parts of a request the resolver looks at.
#[derive(Debug, Clone)]
pub struct RequestTriple {
    /// Request verb.
    pub verb: Method,
    /// Raw (still percent-encoded) positional segments.
    pub segments: Vec<String>,
    /// Raw query string, without the leading `?`.
    pub query: String,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// `Accept` header, if any.
    pub accept: Option<String>,
}

impl RequestTriple {
    /// Creates a request with no query, content type or accept header.
    pub fn new(verb: Method, segments: Vec<String>) -> Self {
        Self {
            verb,
            segments,
            query: String::new(),
            content_type: None,
            accept: None,
        }
    }

    /// Sets the raw query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the accept specification.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// A successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resource the request was resolved against.
    pub resource: Arc<Resource>,
    /// The winning registration.
    pub registration: Arc<Registration>,
    /// Decoded positional and keyword arguments.
    pub arguments: Arguments,
    /// Parsed request content type, for body-carrying verbs.
    pub content_type: Option<MediaType>,
    /// Negotiated response media type, when one is concrete.
    pub response_type: Option<MediaType>,
}

struct Candidate {
    registration: Arc<Registration>,
    positionals: SmallVec<[Value; 4]>,
    score: f64,
    response_type: Option<MediaType>,
}

/// Resolves requests against a [`Registry`].
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<Registry>,
}

impl Resolver {
    /// Creates a resolver over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// The registry this resolver reads.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Resolves `request` against `resource`.
    pub fn resolve(&self, resource: &str, request: &RequestTriple) -> Result<Resolution, Condition> {
        let snapshot = self.registry.snapshot();
        let lattice = snapshot.lattice();

        let res = snapshot
            .resource(resource)
            .ok_or_else(|| Condition::resource_unknown(resource))?;

        let candidates = decode_positionals(res, request)?;
        debug!(resource, decoded = candidates.len(), "positional arguments decoded");

        let candidates = filter_verb(res, request, candidates)?;
        let candidates = score_media(res, lattice, request, candidates)?;

        let count = request.segments.len();
        let winner = candidates
            .into_iter()
            .max_by(|a, b| compare(a, b, count))
            .ok_or_else(|| Condition::resource_unknown(resource))?;

        debug!(
            resource,
            signature = %winner.registration.signature(),
            score = winner.score,
            "selected registration"
        );

        let arguments = complete_arguments(res, &winner.registration, winner.positionals, &request.query)?;

        let content_type = if carries_body(&request.verb) {
            request
                .content_type
                .as_deref()
                .and_then(|ct| ct.parse().ok())
        } else {
            None
        };

        Ok(Resolution {
            resource: Arc::clone(res),
            registration: winner.registration,
            arguments,
            content_type,
            response_type: winner.response_type,
        })
    }
}

fn decode_positionals(res: &Resource, request: &RequestTriple) -> Result<Vec<Candidate>, Condition> {
    let count = request.segments.len();
    let mut admitted = false;
    let mut first_error: Option<ArgumentError> = None;
    let mut candidates = Vec::new();

    for registration in res.registrations().iter().filter(|r| r.admits(count)) {
        admitted = true;
        match decode_segments(res, registration, &request.segments) {
            Ok(positionals) => candidates.push(Candidate {
                registration: Arc::clone(registration),
                positionals,
                score: 0.0,
                response_type: None,
            }),
            Err(err) => {
                debug!(
                    resource = res.name(),
                    signature = %registration.signature(),
                    error = %err,
                    "candidate eliminated"
                );
                first_error.get_or_insert(err);
            }
        }
    }

    if !admitted {
        return Err(Condition::PathShapeMismatch {
            resource: res.name().to_string(),
            segments: count,
        });
    }

    match (candidates.is_empty(), first_error) {
        (true, Some(err)) => Err(Condition::ArgumentDecode {
            slot: err.slot().to_string(),
            message: err.reason(),
        }),
        _ => Ok(candidates),
    }
}

fn filter_verb(
    res: &Resource,
    request: &RequestTriple,
    candidates: Vec<Candidate>,
) -> Result<Vec<Candidate>, Condition> {
    let allowed: Vec<Method> = candidates
        .iter()
        .filter_map(|c| c.registration.verb().method().cloned())
        .collect();

    let remaining: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.registration.verb().matches(&request.verb))
        .collect();

    if remaining.is_empty() {
        return Err(Condition::VerbNotAllowed {
            resource: res.name().to_string(),
            verb: request.verb.clone(),
            allowed: sort_verbs(allowed),
        });
    }
    Ok(remaining)
}

fn score_media(
    res: &Resource,
    lattice: &MediaLattice,
    request: &RequestTriple,
    candidates: Vec<Candidate>,
) -> Result<Vec<Candidate>, Condition> {
    let accept = AcceptList::from_header(request.accept.as_deref());

    if carries_body(&request.verb) {
        let unsupported = || Condition::UnsupportedPayloadType {
            resource: res.name().to_string(),
            content_type: request
                .content_type
                .clone()
                .unwrap_or_else(|| MediaType::octet_stream().to_string()),
        };

        let content_type = match request.content_type.as_deref() {
            None => MediaType::octet_stream(),
            Some(raw) => raw.parse().map_err(|_| unsupported())?,
        };
        let response_type = accept.preferred_concrete().cloned();

        let scored: Vec<Candidate> = candidates
            .into_iter()
            .filter_map(|mut c| {
                c.score = lattice.content_score(c.registration.media(), &content_type);
                c.response_type = response_type.clone();
                (c.score > 0.0).then_some(c)
            })
            .collect();

        if scored.is_empty() {
            return Err(unsupported());
        }
        Ok(scored)
    } else {
        let scored: Vec<Candidate> = candidates
            .into_iter()
            .filter_map(|mut c| {
                let handler_media = c.registration.media();
                let negotiation = accept.negotiate(lattice, handler_media)?;
                c.score = negotiation.score;
                c.response_type = if negotiation.media.is_concrete() {
                    Some(negotiation.media)
                } else if handler_media.is_concrete() {
                    Some(handler_media.clone())
                } else {
                    None
                };
                Some(c)
            })
            .collect();

        if scored.is_empty() {
            return Err(Condition::MediaTypeUnacceptable {
                resource: res.name().to_string(),
                accept: request.accept.clone().unwrap_or_else(|| accept.to_string()),
            });
        }
        Ok(scored)
    }
}

/// Decodes raw positional segments under one registration's specializers.
pub(crate) fn decode_segments(
    res: &Resource,
    registration: &Registration,
    segments: &[String],
) -> Result<SmallVec<[Value; 4]>, ArgumentError> {
    segments
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let spec = registration.positional_spec(index).cloned().unwrap_or_default();
            res.codec().decode(raw, Slot::Positional(index), &spec)
        })
        .collect()
}

/// Completes decoded positionals with optional defaults and the query string.
pub(crate) fn complete_arguments(
    res: &Resource,
    registration: &Registration,
    positionals: SmallVec<[Value; 4]>,
    query: &str,
) -> Result<Arguments, Condition> {
    let count = positionals.len();
    let mut arguments = Arguments::from_positional(positionals);
    for default in registration.missing_defaults(count) {
        arguments.push_positional(default.clone());
    }
    decode_keywords(res, registration, query, &mut arguments)?;
    Ok(arguments)
}

fn compare(a: &Candidate, b: &Candidate, count: usize) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| rank(&a.registration, &b.registration, count))
}

/// Orders registrations that scored equally on media: more specific
/// positional specializers, then a more specific media type, then the
/// earlier registration.
pub(crate) fn rank(a: &Registration, b: &Registration, count: usize) -> Ordering {
    a.positional_specificity(count)
        .cmp(&b.positional_specificity(count))
        .then_with(|| a.media().specificity().cmp(&b.media().specificity()))
        .then_with(|| b.sequence().cmp(&a.sequence()))
}

fn decode_keywords(
    res: &Resource,
    registration: &Registration,
    query: &str,
    arguments: &mut Arguments,
) -> Result<(), Condition> {
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_name, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode_component(raw_name, true)
            .map_err(|_| Condition::keyword(raw_name, "keyword name is not valid UTF-8"))?;

        let Some(keyword) = registration.keyword(&name) else {
            return Err(Condition::keyword(name, "unknown keyword"));
        };
        if arguments.keyword(&name).is_some() {
            return Err(Condition::keyword(name, "keyword given more than once"));
        }

        let value = res
            .codec()
            .decode(raw_value, Slot::Keyword(&name), &keyword.spec)
            .map_err(|err| Condition::keyword(name.as_str(), err.reason()))?;
        arguments.insert_keyword(name, value);
    }

    for keyword in registration.keywords() {
        if arguments.keyword(&keyword.name).is_some() {
            continue;
        }
        match &keyword.default {
            Some(default) => arguments.insert_keyword(keyword.name.clone(), default.clone()),
            None => return Err(Condition::keyword(keyword.name.as_str(), "required keyword is missing")),
        }
    }

    Ok(())
}
