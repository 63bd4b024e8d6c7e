//! Service descriptors: the statically-declared service inventory.

use std::sync::Arc;

use crate::error::CoreResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::AnyArc;
use crate::resolve::Resolution;

/// Constructor-as-factory for one service. The closure receives a
/// resolver through which it pulls its constructor parameters.
pub(crate) type CtorFn =
    Arc<dyn Fn(&mut Resolution<'_, '_>) -> CoreResult<AnyArc> + Send + Sync>;

/// Adapter from the stored concrete instance to one of its declared
/// capabilities; `None` means the stored value was not the expected
/// concrete type, which cannot happen for descriptor-built instances.
pub(crate) type CastFn = Arc<dyn Fn(AnyArc) -> Option<AnyArc> + Send + Sync>;

/// A capability a service declares it satisfies. Resolution matches
/// capability keys exactly instead of scanning type hierarchies, so
/// ambiguity is a build-time defect rather than a lookup surprise.
pub(crate) struct Capability {
    pub(crate) key: Key,
    pub(crate) cast: CastFn,
}

/// Identity, lifecycle category, and constructor of one known service.
/// Immutable once the inventory is built.
pub struct ServiceDescriptor {
    pub(crate) key: Key,
    pub(crate) lifetime: Lifetime,
    pub(crate) provides: Vec<Capability>,
    pub(crate) ctor: CtorFn,
}

impl ServiceDescriptor {
    /// The concrete type name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Declared lifecycle category.
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    /// Whether a requested key is satisfied by this descriptor, either
    /// as its concrete type or one of its declared capabilities.
    pub(crate) fn satisfies(&self, key: &Key) -> bool {
        self.key == *key || self.provides.iter().any(|cap| cap.key == *key)
    }
}
