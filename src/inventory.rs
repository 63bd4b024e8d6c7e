//! Service registration surface.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::container::{Container, ContainerShared};
use crate::descriptors::{Capability, ServiceDescriptor};
use crate::error::{CoreError, CoreResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::registry::{AnyArc, InstanceSet};
use crate::resolve::Resolution;

/// Builder for the service inventory.
///
/// The inventory is the finished, statically-declared table of every
/// known service: its concrete type, lifecycle category, provided
/// capabilities, and constructor-as-factory. [`Inventory::build`]
/// validates it (no two providers for one key), eagerly constructs all
/// singletons, and produces the immutable [`Container`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use switchboard::{Inventory, Lifetime};
///
/// trait Mailer: Send + Sync {
///     fn send(&self, to: &str) -> String;
/// }
///
/// struct SmtpMailer;
/// impl Mailer for SmtpMailer {
///     fn send(&self, to: &str) -> String {
///         format!("sent to {to}")
///     }
/// }
///
/// struct Notifier {
///     mailer: Arc<dyn Mailer>,
/// }
///
/// let mut inventory = Inventory::new();
/// inventory
///     .add_service::<SmtpMailer, _>(Lifetime::Singleton, |_| Ok(SmtpMailer))
///     .provides::<SmtpMailer, dyn Mailer, _>(|m| m)
///     .add_service::<Notifier, _>(Lifetime::Singleton, |r| {
///         Ok(Notifier { mailer: r.get_trait::<dyn Mailer>()? })
///     });
///
/// let container = inventory.build().unwrap();
/// let notifier = container.get::<Notifier>().unwrap();
/// assert_eq!(notifier.mailer.send("ops"), "sent to ops");
/// ```
#[derive(Default)]
pub struct Inventory {
    descriptors: Vec<ServiceDescriptor>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service with a constructor-as-factory. Dependencies
    /// are pulled through the [`Resolution`] the factory receives.
    pub fn add_service<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Resolution<'_, '_>) -> CoreResult<T> + Send + Sync + 'static,
    {
        self.descriptors.push(ServiceDescriptor {
            key: key_of_type::<T>(),
            lifetime,
            provides: Vec::new(),
            ctor: Arc::new(move |r| Ok(Arc::new(factory(r)?) as AnyArc)),
        });
        self
    }

    /// Register an already-constructed singleton instance.
    pub fn add_instance<T: Send + Sync + 'static>(&mut self, value: T) -> &mut Self {
        let stored: AnyArc = Arc::new(value);
        self.descriptors.push(ServiceDescriptor {
            key: key_of_type::<T>(),
            lifetime: Lifetime::Singleton,
            provides: Vec::new(),
            ctor: Arc::new(move |_| Ok(stored.clone())),
        });
        self
    }

    /// Declare that service `T` satisfies capability `C`. The cast
    /// closure performs the unsizing coercion (usually just `|s| s`).
    ///
    /// # Panics
    ///
    /// Panics if `T` has not been registered yet; declaring a
    /// capability for an unknown service is a programming error at the
    /// registration site.
    pub fn provides<T, C, F>(&mut self, cast: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<T>) -> Arc<C> + Send + Sync + 'static,
    {
        let key = key_of_type::<T>();
        let descriptor = self
            .descriptors
            .iter_mut()
            .rev()
            .find(|d| d.key == key)
            .unwrap_or_else(|| {
                panic!(
                    "provides::<{}, _, _> before add_service",
                    std::any::type_name::<T>()
                )
            });
        descriptor.provides.push(Capability {
            key: key_of_trait::<C>(),
            cast: Arc::new(move |any: AnyArc| {
                let concrete = any.downcast::<T>().ok()?;
                Some(Arc::new(cast(concrete)) as AnyArc)
            }),
        });
        self
    }

    /// Access the registered descriptors, for startup diagnostics.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Validate the inventory and build the container, constructing
    /// every singleton eagerly so configuration defects surface at
    /// startup rather than at request time.
    pub fn build(self) -> CoreResult<Container> {
        let mut providers: HashMap<Key, &'static str> = HashMap::new();
        for descriptor in &self.descriptors {
            let mut keys = vec![descriptor.key.clone()];
            keys.extend(descriptor.provides.iter().map(|cap| cap.key.clone()));
            for key in keys {
                let name = key.display_name();
                if providers.insert(key, descriptor.type_name()).is_some() {
                    return Err(CoreError::AmbiguousDependency(name));
                }
            }
        }

        let container = Container::from_shared(ContainerShared {
            descriptors: self.descriptors,
            singletons: RwLock::new(InstanceSet::default()),
            sessions: Mutex::new(HashMap::new()),
        });
        container.reload_singletons()?;
        Ok(container)
    }
}
