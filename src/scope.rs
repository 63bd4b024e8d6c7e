//! Per-dispatch scope: request-local instances and platform beans.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::container::Container;
use crate::error::{CoreError, CoreResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::registry::{AnyArc, InstanceSet};

/// State owned by one logical dispatch.
///
/// A scope holds the request-local instance set (rebuilt by
/// [`reload_request`](DispatchScope::reload_request) before parameter
/// binding begins) and the platform beans: framework-supplied values
/// such as the current request, response, or in-flight fault, which are
/// injected like services but exempt from lifecycle reload.
///
/// Each dispatch owns its scope by value, so request-local state cannot
/// leak between concurrent dispatches. Never cache resolved references
/// across a reload boundary; re-fetch through the scope instead.
pub struct DispatchScope {
    pub(crate) container: Container,
    session_id: Option<String>,
    pub(crate) session: Option<Arc<Mutex<InstanceSet>>>,
    pub(crate) request_set: InstanceSet,
    pub(crate) beans: InstanceSet,
}

impl DispatchScope {
    /// Open a scope for one dispatch. A session id attaches (and, for a
    /// brand-new session, populates) that session's instance set.
    pub fn new(container: &Container, session_id: Option<&str>) -> CoreResult<Self> {
        let session = match session_id {
            Some(id) => Some(container.ensure_session(id)?),
            None => None,
        };
        Ok(Self {
            container: container.clone(),
            session_id: session_id.map(str::to_string),
            session,
            request_set: InstanceSet::default(),
            beans: InstanceSet::default(),
        })
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Register a platform bean under its concrete type.
    pub fn add_bean<T: Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.beans.insert(key_of_type::<T>(), value as AnyArc);
    }

    /// Register a platform bean under a trait key, e.g. the current
    /// request as `dyn Request`.
    pub fn add_bean_trait<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) {
        self.beans
            .insert(key_of_trait::<T>(), Arc::new(value) as AnyArc);
    }

    pub(crate) fn add_bean_keyed(&mut self, key: Key, value: AnyArc) {
        self.beans.insert(key, value);
    }

    /// Look up a platform bean by key. Parameter binding consults only
    /// this set, never the service sets.
    pub(crate) fn bean(&self, key: &Key) -> Option<AnyArc> {
        self.beans.find(key).cloned()
    }

    /// Find a live instance by key across every set visible to this
    /// dispatch: beans, request set, session set, singletons.
    pub(crate) fn live_find(&self, key: &Key) -> Option<AnyArc> {
        if let Some(value) = self.beans.find(key) {
            return Some(value.clone());
        }
        if let Some(value) = self.request_set.find(key) {
            return Some(value.clone());
        }
        if let Some(session) = &self.session {
            if let Some(value) = session.lock().find(key) {
                return Some(value.clone());
            }
        }
        self.container.singleton_find(key)
    }

    /// Fetch a live instance by concrete type.
    pub fn get<T: Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let key = key_of_type::<T>();
        match self.live_find(&key) {
            Some(value) => value
                .downcast::<T>()
                .map_err(|_| CoreError::TypeMismatch(std::any::type_name::<T>())),
            None => Err(CoreError::DependencyUnresolved(key.display_name())),
        }
    }

    /// Fetch a live instance by capability trait.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let key = key_of_trait::<T>();
        match self.live_find(&key) {
            Some(value) => value
                .downcast_ref::<Arc<T>>()
                .cloned()
                .ok_or(CoreError::TypeMismatch(std::any::type_name::<T>())),
            None => Err(CoreError::DependencyUnresolved(key.display_name())),
        }
    }
}
