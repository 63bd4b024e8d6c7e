//! The process-wide container: descriptor table, singleton set, and
//! session-keyed instance sets.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::descriptors::ServiceDescriptor;
use crate::error::{CoreError, CoreResult};
use crate::key::{key_of_trait, key_of_type, Key};
use crate::registry::{AnyArc, InstanceSet};

/// Shared, read-mostly container state. Built once at startup by
/// [`Inventory::build`](crate::Inventory::build) and threaded through
/// every dispatch as an explicit context object, never ambient state.
pub(crate) struct ContainerShared {
    pub(crate) descriptors: Vec<ServiceDescriptor>,
    pub(crate) singletons: RwLock<InstanceSet>,
    pub(crate) sessions: Mutex<HashMap<String, Arc<Mutex<InstanceSet>>>>,
}

/// Handle to the container. Cheap to clone; all clones share the same
/// descriptor table, singleton set, and session map.
pub struct Container {
    pub(crate) shared: Arc<ContainerShared>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl Container {
    pub(crate) fn from_shared(shared: ContainerShared) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// The immutable descriptor table.
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.shared.descriptors
    }

    pub(crate) fn descriptor_for(&self, key: &Key) -> Option<&ServiceDescriptor> {
        self.shared.descriptors.iter().find(|d| d.satisfies(key))
    }

    /// Fetch a live singleton by concrete type.
    ///
    /// Only already-built singletons are visible here; request- and
    /// session-scoped instances live on the
    /// [`DispatchScope`](crate::DispatchScope).
    pub fn get<T: Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let key = key_of_type::<T>();
        let singletons = self.shared.singletons.read();
        match singletons.find(&key) {
            Some(value) => value
                .clone()
                .downcast::<T>()
                .map_err(|_| CoreError::TypeMismatch(std::any::type_name::<T>())),
            None => Err(CoreError::DependencyUnresolved(key.display_name())),
        }
    }

    /// Fetch a live singleton by capability trait.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self) -> CoreResult<Arc<T>> {
        let key = key_of_trait::<T>();
        let singletons = self.shared.singletons.read();
        match singletons.find(&key) {
            Some(value) => value
                .downcast_ref::<Arc<T>>()
                .cloned()
                .ok_or(CoreError::TypeMismatch(std::any::type_name::<T>())),
            None => Err(CoreError::DependencyUnresolved(key.display_name())),
        }
    }

    /// Get or create the instance set for a session id. Creation only
    /// inserts the empty set; population happens under the set's own
    /// lock so concurrent first requests of one session cannot diverge.
    pub(crate) fn session_entry(&self, session_id: &str) -> Arc<Mutex<InstanceSet>> {
        let mut sessions = self.shared.sessions.lock();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(InstanceSet::default())))
            .clone()
    }

    /// Drop a session's instances entirely, e.g. on logout. The next
    /// request carrying this session id rebuilds them fresh.
    pub fn evict_session(&self, session_id: &str) {
        self.shared.sessions.lock().remove(session_id);
    }

    /// Look up a live singleton entry by key.
    pub(crate) fn singleton_find(&self, key: &Key) -> Option<AnyArc> {
        self.shared.singletons.read().find(key).cloned()
    }
}
