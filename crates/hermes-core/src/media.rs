//! Media types, the specificity lattice and accept-header negotiation.
//!
//! Handlers are specialized on a media type that is either concrete
//! (`text/html`), a partial wildcard (`text/*`) or the full wildcard (`*/*`).
//! The [`MediaLattice`] orders those specializers and knows about registered
//! aliases; [`AcceptList`] scores a handler's specializer against a client's
//! `Accept` header.
//!
//! # Example
//!
//! ```rust
//! use hermes_core::media::{AcceptList, MediaLattice, MediaType};
//!
//! let lattice = MediaLattice::new();
//! let accept = AcceptList::parse("text/*;q=0.5, application/json");
//!
//! let json: MediaType = "application/json".parse().unwrap();
//! let html: MediaType = "text/html".parse().unwrap();
//!
//! assert!(accept.score(&lattice, &json) > accept.score(&lattice, &html));
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const WILDCARD: &str = "*";

/// Error returned when a media type string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid media type '{input}': {reason}")]
pub struct MediaTypeError {
    input: String,
    reason: String,
}

impl MediaTypeError {
    fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns the text that failed to parse.
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// How specific a media type specializer is.
///
/// Ordered from least to most specific, so `Concrete > PartialWildcard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// `*/*`
    FullWildcard,
    /// `type/*`
    PartialWildcard,
    /// `type/subtype`
    Concrete,
}

impl Specificity {
    /// Numeric rank used in negotiation scores (1, 2 or 3).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::FullWildcard => 1,
            Self::PartialWildcard => 2,
            Self::Concrete => 3,
        }
    }
}

/// A media type or media range without parameters.
///
/// Type and subtype are stored lowercased. Parameters such as `charset` or
/// `q` are accepted while parsing but ignored for matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaType {
    type_: String,
    subtype: String,
}

impl MediaType {
    /// The full wildcard `*/*`.
    #[must_use]
    pub fn any() -> Self {
        Self {
            type_: WILDCARD.to_string(),
            subtype: WILDCARD.to_string(),
        }
    }

    /// `application/octet-stream`, assumed for payloads without a content type.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self {
            type_: "application".to_string(),
            subtype: "octet-stream".to_string(),
        }
    }

    /// Builds a media type from its parts.
    pub fn new(type_: &str, subtype: &str) -> Result<Self, MediaTypeError> {
        format!("{type_}/{subtype}").parse()
    }

    /// The top-level type (`text` in `text/html`).
    pub fn type_(&self) -> &str {
        &self.type_
    }

    /// The subtype (`html` in `text/html`).
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Returns how specific this media type is.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        if self.type_ == WILDCARD {
            Specificity::FullWildcard
        } else if self.subtype == WILDCARD {
            Specificity::PartialWildcard
        } else {
            Specificity::Concrete
        }
    }

    /// Returns `true` for `type/subtype` without wildcards.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.specificity() == Specificity::Concrete
    }

    /// Returns `true` when this is a JSON media type (`application/json` or `+json`).
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.type_ == "application" && (self.subtype == "json" || self.subtype.ends_with("+json"))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed: mime::Mime = trimmed
            .parse()
            .map_err(|e: mime::FromStrError| MediaTypeError::new(s, e.to_string()))?;

        let essence = parsed.essence_str().to_ascii_lowercase();
        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MediaTypeError::new(s, "missing '/'"))?;

        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(MediaTypeError::new(s, "wildcard type requires wildcard subtype"));
        }

        Ok(Self {
            type_: type_.to_string(),
            subtype: subtype.to_string(),
        })
    }
}

/// The specificity lattice over media types, including registered aliases.
///
/// A concrete `type/subtype` is strictly more specific than `type/*`, which is
/// strictly more specific than `*/*`. Two concrete types with different
/// subtypes are disjoint unless one is a registered alias of the other, in
/// which case they compare equal.
#[derive(Debug, Clone, Default)]
pub struct MediaLattice {
    /// alias -> canonical, concrete types only
    aliases: HashMap<MediaType, MediaType>,
}

impl MediaLattice {
    /// Creates a lattice without aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `alias` as an alternative name for `canonical`.
    ///
    /// Both must be concrete, and the alias must not already resolve to a
    /// different canonical type.
    pub fn alias(&mut self, alias: MediaType, canonical: MediaType) -> Result<(), MediaTypeError> {
        if !alias.is_concrete() || !canonical.is_concrete() {
            return Err(MediaTypeError::new(
                format!("{alias} -> {canonical}"),
                "only concrete media types can be aliased",
            ));
        }
        let target = self.canonical(&canonical).clone();
        if target == alias {
            return Err(MediaTypeError::new(
                format!("{alias} -> {canonical}"),
                "alias would form a cycle",
            ));
        }
        if self.canonical(&alias) != &alias && self.canonical(&alias) != &target {
            return Err(MediaTypeError::new(
                format!("{alias} -> {canonical}"),
                "alias is already bound to another media type",
            ));
        }
        self.aliases.insert(alias, target);
        Ok(())
    }

    /// Number of registered aliases.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    fn canonical<'a>(&'a self, media: &'a MediaType) -> &'a MediaType {
        let mut current = media;
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Returns `true` when both name the same media type, directly or via aliases.
    pub fn equivalent(&self, a: &MediaType, b: &MediaType) -> bool {
        a == b || self.canonical(a) == self.canonical(b)
    }

    /// Returns `true` if `range` covers `media`.
    pub fn contains(&self, range: &MediaType, media: &MediaType) -> bool {
        match range.specificity() {
            Specificity::FullWildcard => true,
            Specificity::PartialWildcard => {
                media.specificity() != Specificity::FullWildcard
                    && (media.type_ == range.type_ || self.canonical(media).type_ == range.type_)
            }
            Specificity::Concrete => media.is_concrete() && self.equivalent(range, media),
        }
    }

    /// Orders two specializers by specificity.
    ///
    /// Returns `Some(Greater)` when `a` is strictly more specific than `b`,
    /// `Some(Equal)` for equivalent types and `None` when they are disjoint.
    pub fn compare(&self, a: &MediaType, b: &MediaType) -> Option<Ordering> {
        if self.equivalent(a, b) {
            Some(Ordering::Equal)
        } else if self.contains(b, a) {
            Some(Ordering::Greater)
        } else if self.contains(a, b) {
            Some(Ordering::Less)
        } else {
            None
        }
    }

    /// The more specific of two comparable specializers, or `None` if disjoint.
    pub fn intersect(&self, a: &MediaType, b: &MediaType) -> Option<MediaType> {
        match self.compare(a, b)? {
            Ordering::Greater | Ordering::Equal => Some(a.clone()),
            Ordering::Less => Some(b.clone()),
        }
    }

    /// Scores a handler specializer against a request payload's content type.
    ///
    /// The score is the rank of the handler's own specificity when it covers
    /// the content type, and zero otherwise.
    pub fn content_score(&self, handler: &MediaType, content_type: &MediaType) -> f64 {
        if self.contains(handler, content_type) {
            f64::from(handler.specificity().rank())
        } else {
            0.0
        }
    }
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry {
    /// The acceptable media range.
    pub media: MediaType,
    /// Quality weight in `[0, 1]`.
    pub quality: f64,
}

/// Result of negotiating one handler specializer against an accept list.
#[derive(Debug, Clone, PartialEq)]
pub struct Negotiation {
    /// `quality × rank` of the best-matching entry; zero excludes the handler.
    pub score: f64,
    /// Intersection of the entry and the handler's specializer.
    pub media: MediaType,
}

/// A parsed `Accept` header, in client order.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptList {
    entries: Vec<AcceptEntry>,
}

impl Default for AcceptList {
    fn default() -> Self {
        Self::any()
    }
}

impl AcceptList {
    /// Accepts everything (`*/*`).
    #[must_use]
    pub fn any() -> Self {
        Self {
            entries: vec![AcceptEntry {
                media: MediaType::any(),
                quality: 1.0,
            }],
        }
    }

    /// Parses an `Accept` header.
    ///
    /// Malformed entries are skipped; an empty result means `*/*`.
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let entries: Vec<AcceptEntry> = header
            .split(',')
            .filter_map(|entry| Self::parse_entry(entry.trim()))
            .collect();

        if entries.is_empty() {
            Self::any()
        } else {
            Self { entries }
        }
    }

    /// Parses an optional header; `None` means `*/*`.
    #[must_use]
    pub fn from_header(header: Option<&str>) -> Self {
        header.map_or_else(Self::any, Self::parse)
    }

    fn parse_entry(entry: &str) -> Option<AcceptEntry> {
        if entry.is_empty() {
            return None;
        }
        let mut parts = entry.split(';');
        let media: MediaType = parts.next()?.trim().parse().ok()?;
        let mut quality = 1.0;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    let q: f64 = value.trim().parse().ok()?;
                    if !q.is_finite() {
                        return None;
                    }
                    quality = q.clamp(0.0, 1.0);
                }
            }
        }
        Some(AcceptEntry { media, quality })
    }

    /// The entries in client order.
    pub fn entries(&self) -> &[AcceptEntry] {
        &self.entries
    }

    /// Negotiates `handler` against this list.
    ///
    /// The best-matching entry is the most specific compatible one, ties going
    /// to the higher quality. Returns `None` when no entry is compatible or the
    /// best one has zero quality.
    pub fn negotiate(&self, lattice: &MediaLattice, handler: &MediaType) -> Option<Negotiation> {
        let (entry, media) = self
            .entries
            .iter()
            .filter_map(|entry| lattice.intersect(&entry.media, handler).map(|m| (entry, m)))
            .max_by(|(a, _), (b, _)| {
                a.media
                    .specificity()
                    .cmp(&b.media.specificity())
                    .then(a.quality.total_cmp(&b.quality))
            })?;

        let score = entry.quality * f64::from(media.specificity().rank());
        (score > 0.0).then_some(Negotiation { score, media })
    }

    /// Shorthand for the negotiation score, zero when excluded.
    pub fn score(&self, lattice: &MediaLattice, handler: &MediaType) -> f64 {
        self.negotiate(lattice, handler).map_or(0.0, |n| n.score)
    }

    /// The concrete media type the client prefers most, if any.
    pub fn preferred_concrete(&self) -> Option<&MediaType> {
        self.entries
            .iter()
            .filter(|e| e.media.is_concrete() && e.quality > 0.0)
            .fold(None::<&AcceptEntry>, |best, e| match best {
                Some(b) if b.quality >= e.quality => Some(b),
                _ => Some(e),
            })
            .map(|e| &e.media)
    }
}

impl fmt::Display for AcceptList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            if (entry.quality - 1.0).abs() < f64::EPSILON {
                write!(f, "{}", entry.media)?;
            } else {
                write!(f, "{};q={}", entry.media, entry.quality)?;
            }
        }
        Ok(())
    }
}
