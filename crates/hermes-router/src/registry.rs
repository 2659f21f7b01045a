//! The resource registry.
//!
//! Writers are serialized behind a lock and publish a new snapshot on every
//! change; readers clone the current snapshot's `Arc` and never block each
//! other or a concurrent writer for longer than the clone.

use std::collections::HashMap;
use std::sync::Arc;

use hermes_codec::{ArgumentCodec, DefaultCodec};
use hermes_core::{MediaLattice, MediaType, MediaTypeError};
use parking_lot::RwLock;

use crate::registration::{Registration, Signature};

/// A named dispatch point and its registrations.
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    registrations: Vec<Arc<Registration>>,
    codec: Arc<dyn ArgumentCodec>,
}

impl Resource {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            registrations: Vec::new(),
            codec: Arc::new(DefaultCodec),
        }
    }

    /// The resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registrations in registration order.
    pub fn registrations(&self) -> &[Arc<Registration>] {
        &self.registrations
    }

    /// The codec used for this resource's arguments.
    pub fn codec(&self) -> &Arc<dyn ArgumentCodec> {
        &self.codec
    }
}

/// An immutable view of the registry at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    resources: HashMap<String, Arc<Resource>>,
    lattice: MediaLattice,
    next_sequence: u64,
}

impl Snapshot {
    /// Looks up a resource.
    pub fn resource(&self, name: &str) -> Option<&Arc<Resource>> {
        self.resources.get(name)
    }

    /// The media lattice, including registered aliases.
    pub fn lattice(&self) -> &MediaLattice {
        &self.lattice
    }

    fn resource_mut(&mut self, name: &str) -> &mut Resource {
        Arc::make_mut(
            self.resources
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Resource::new(name))),
        )
    }
}

/// Registry of resources, shared between the resolver, the generator and
/// whatever code registers handlers.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Invocation, Reply, TypeSpec};
/// use hermes_router::{Registration, Registry};
/// use http::Method;
///
/// let registry = Registry::new();
/// registry.register(
///     "widget",
///     Registration::builder()
///         .verb(Method::GET)
///         .positional(TypeSpec::Integer)
///         .handler(|_inv: Invocation| async { Ok::<_, anyhow::Error>(Reply::text("ok")) })
///         .build()
///         .unwrap(),
/// );
///
/// assert_eq!(registry.resources(), vec!["widget".to_string()]);
/// assert_eq!(registry.lookup("widget").unwrap().registrations().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    state: RwLock<Arc<Snapshot>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read())
    }

    fn update<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> R {
        let mut guard = self.state.write();
        f(Arc::make_mut(&mut guard))
    }

    /// Adds a registration to `resource`, creating the resource if needed.
    ///
    /// A registration with the same signature as an existing one replaces it
    /// and keeps its place in registration order. Returns `true` on replace.
    pub fn register(&self, resource: &str, mut registration: Registration) -> bool {
        let signature = registration.signature().to_string();
        let replaced = self.update(|state| {
            let sequence = state.next_sequence;
            let res = state.resource_mut(resource);

            if let Some(index) = res
                .registrations
                .iter()
                .position(|r| r.signature() == registration.signature())
            {
                registration.set_sequence(res.registrations[index].sequence());
                res.registrations[index] = Arc::new(registration);
                true
            } else {
                registration.set_sequence(sequence);
                res.registrations.push(Arc::new(registration));
                state.next_sequence += 1;
                false
            }
        });

        tracing::info!(resource, %signature, replaced, "registered handler");
        replaced
    }

    /// Returns the current state of a resource.
    pub fn lookup(&self, resource: &str) -> Option<Arc<Resource>> {
        self.state.read().resource(resource).cloned()
    }

    /// Removes the registration with `signature`. Returns `true` if one existed.
    ///
    /// The resource itself remains, even with no registrations left.
    pub fn unregister(&self, resource: &str, signature: &Signature) -> bool {
        let removed = self.update(|state| {
            let Some(res) = state.resources.get_mut(resource) else {
                return false;
            };
            let Some(index) = res
                .registrations
                .iter()
                .position(|r| r.signature() == signature)
            else {
                return false;
            };
            Arc::make_mut(res).registrations.remove(index);
            true
        });

        if removed {
            tracing::info!(resource, %signature, "unregistered handler");
        }
        removed
    }

    /// Installs a codec for `resource`, creating the resource if needed.
    pub fn set_codec(&self, resource: &str, codec: Arc<dyn ArgumentCodec>) {
        let name = codec.name();
        self.update(|state| state.resource_mut(resource).codec = codec);
        tracing::info!(resource, codec = name, "installed resource codec");
    }

    /// Declares `alias` equivalent to the concrete type `canonical`.
    pub fn alias_media_type(&self, alias: MediaType, canonical: MediaType) -> Result<(), MediaTypeError> {
        self.update(|state| state.lattice.alias(alias.clone(), canonical.clone()))?;
        tracing::info!(%alias, %canonical, "registered media type alias");
        Ok(())
    }

    /// Names of all resources, sorted.
    pub fn resources(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().resources.keys().cloned().collect();
        names.sort();
        names
    }
}
