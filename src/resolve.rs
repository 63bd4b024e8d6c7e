//! Find-or-build dependency resolution.
//!
//! A [`Resolution`] is the context handed to service constructors. It
//! searches already-live instances in stable registration order, then
//! falls back to instantiating a not-yet-built descriptor of the active
//! lifecycle category, resolving that descriptor's own parameters
//! recursively. A per-resolution visited stack turns would-be unbounded
//! recursion into a `DependencyCycle` error.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::descriptors::ServiceDescriptor;
use crate::error::{CoreError, CoreResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::registry::{AnyArc, InstanceSet};

/// Resolver context passed to service constructors.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use switchboard::{Inventory, Lifetime};
///
/// struct Config { port: u16 }
/// struct Listener { config: Arc<Config> }
///
/// let mut inventory = Inventory::new();
/// inventory.add_service::<Config, _>(Lifetime::Singleton, |_| Ok(Config { port: 8080 }));
/// inventory.add_service::<Listener, _>(Lifetime::Singleton, |r| {
///     Ok(Listener { config: r.get::<Config>()? })
/// });
///
/// let container = inventory.build().unwrap();
/// let listener = container.get::<Listener>().unwrap();
/// assert_eq!(listener.config.port, 8080);
/// ```
pub struct Resolution<'d, 's> {
    descriptors: &'d [ServiceDescriptor],
    category: Lifetime,
    target: &'s mut InstanceSet,
    outer: &'s [&'s InstanceSet],
    stack: &'s mut Vec<&'static str>,
}

impl<'d, 's> Resolution<'d, 's> {
    pub(crate) fn new(
        descriptors: &'d [ServiceDescriptor],
        category: Lifetime,
        target: &'s mut InstanceSet,
        outer: &'s [&'s InstanceSet],
        stack: &'s mut Vec<&'static str>,
    ) -> Self {
        Self {
            descriptors,
            category,
            target,
            outer,
            stack,
        }
    }

    /// Resolve a concrete service type.
    pub fn get<T: Send + Sync + 'static>(&mut self) -> CoreResult<Arc<T>> {
        let key = key_of_type::<T>();
        self.resolve_key(&key)?
            .downcast::<T>()
            .map_err(|_| CoreError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolve a capability trait, e.g. `r.get_trait::<dyn Mailer>()`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&mut self) -> CoreResult<Arc<T>> {
        let key = key_of_trait::<T>();
        let any = self.resolve_key(&key)?;
        any.downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(CoreError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Find a live instance assignable to `key`, or build one from the
    /// descriptors of the active category.
    pub(crate) fn resolve_key(&mut self, key: &Key) -> CoreResult<AnyArc> {
        trace!(key = key.display_name(), "resolving");

        for set in self.outer {
            if let Some(value) = set.find(key) {
                return Ok(value.clone());
            }
        }
        if let Some(value) = self.target.find(key) {
            return Ok(value.clone());
        }

        let index = self
            .descriptors
            .iter()
            .position(|d| d.lifetime == self.category && d.satisfies(key));
        match index {
            Some(index) => self.build(index),
            None => Err(CoreError::DependencyUnresolved(key.display_name())),
        }
    }

    /// Instantiate one descriptor, registering the instance and its
    /// capability entries in the target set.
    pub(crate) fn build(&mut self, index: usize) -> CoreResult<AnyArc> {
        let descriptors = self.descriptors;
        let descriptor = &descriptors[index];
        let name = descriptor.key.display_name();

        if self.stack.iter().any(|entered| *entered == name) {
            let mut path = self.stack.clone();
            path.push(name);
            return Err(CoreError::DependencyCycle(path));
        }

        self.stack.push(name);
        let built = (descriptor.ctor)(self);
        self.stack.pop();
        let value = built?;

        debug!(service = name, category = ?descriptor.lifetime, "instantiated");
        self.target.insert(descriptor.key.clone(), value.clone());
        for cap in &descriptor.provides {
            if let Some(adapted) = (cap.cast)(value.clone()) {
                self.target.insert(cap.key.clone(), adapted);
            }
        }
        Ok(value)
    }
}
