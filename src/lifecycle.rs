//! Bulk lifecycle reload and single-handler rebuild.
//!
//! `reload` destroys every live instance of one category, then
//! re-resolves each descriptor fresh so cross-references among
//! same-category services are rebuilt consistently. References handed
//! out before a reload are stale afterwards; callers must re-fetch.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::container::Container;
use crate::error::{CoreError, CoreResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registry::{AnyArc, InstanceSet};
use crate::resolve::Resolution;
use crate::scope::DispatchScope;

impl Container {
    /// Rebuild the process-wide singleton set. Runs at startup from
    /// [`Inventory::build`](crate::Inventory::build) and on demand.
    pub fn reload_singletons(&self) -> CoreResult<()> {
        debug!("reloading singleton services");
        let descriptors = &self.shared.descriptors;
        let mut singletons = self.shared.singletons.write();
        singletons.clear();
        let mut stack = Vec::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.lifetime != Lifetime::Singleton {
                continue;
            }
            if singletons.find(&descriptor.key).is_some() {
                continue;
            }
            let mut resolution = Resolution::new(
                descriptors,
                Lifetime::Singleton,
                &mut singletons,
                &[],
                &mut stack,
            );
            resolution.build(index)?;
        }
        Ok(())
    }

    /// Rebuild one session's instances, keyed by session id. Sessions
    /// that were never seen simply get built fresh.
    pub fn reload_session(&self, session_id: &str) -> CoreResult<()> {
        debug!(session = session_id, "reloading session services");
        let entry = self.session_entry(session_id);
        let mut set = entry.lock();
        set.clear();
        self.populate_session(&mut set)
    }

    /// Attach a session's instance set, populating it on first sight.
    /// Population happens while holding the set's own lock, so the
    /// second concurrent request of a brand-new session waits and
    /// reuses the first writer's instances.
    pub(crate) fn ensure_session(&self, session_id: &str) -> CoreResult<Arc<Mutex<InstanceSet>>> {
        let entry = self.session_entry(session_id);
        {
            let mut set = entry.lock();
            if set.is_empty() {
                self.populate_session(&mut set)?;
            }
        }
        Ok(entry)
    }

    fn populate_session(&self, set: &mut InstanceSet) -> CoreResult<()> {
        let descriptors = &self.shared.descriptors;
        let singletons = self.shared.singletons.read();
        let mut stack = Vec::new();
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.lifetime != Lifetime::Session {
                continue;
            }
            if set.find(&descriptor.key).is_some() {
                continue;
            }
            let outer = [&*singletons];
            let mut resolution =
                Resolution::new(descriptors, Lifetime::Session, set, &outer, &mut stack);
            resolution.build(index)?;
        }
        Ok(())
    }
}

impl DispatchScope {
    /// Destroy and rebuild every request-scoped instance. Must run
    /// before parameter binding begins for each request; the engine
    /// does this at the top of every route dispatch.
    pub fn reload_request(&mut self) -> CoreResult<()> {
        self.request_set.clear();
        let shared = self.container.shared.clone();
        // Session lock first, then singletons, matching
        // populate_session's acquisition order.
        let session_guard = self.session.as_ref().map(|s| s.lock());
        let singletons = shared.singletons.read();

        let mut outer: Vec<&InstanceSet> = vec![&self.beans];
        if let Some(guard) = session_guard.as_ref() {
            outer.push(&**guard);
        }
        outer.push(&*singletons);

        let mut stack = Vec::new();
        for (index, descriptor) in shared.descriptors.iter().enumerate() {
            if descriptor.lifetime != Lifetime::Request {
                continue;
            }
            if self.request_set.find(&descriptor.key).is_some() {
                continue;
            }
            let mut resolution = Resolution::new(
                &shared.descriptors,
                Lifetime::Request,
                &mut self.request_set,
                &outer,
                &mut stack,
            );
            resolution.build(index)?;
        }
        Ok(())
    }

    /// Rebuild a single request-scoped handler on demand, using the
    /// same constructor-resolution logic as a bulk reload, without
    /// touching the rest of the category. The fresh instance replaces
    /// the stale entry in the request set.
    pub(crate) fn reload_handler(&mut self, key: &Key) -> CoreResult<AnyArc> {
        let shared = self.container.shared.clone();
        let index = shared
            .descriptors
            .iter()
            .position(|d| d.satisfies(key))
            .ok_or(CoreError::DependencyUnresolved(key.display_name()))?;
        let category = shared.descriptors[index].lifetime;

        // Session lock first, then singletons, matching
        // populate_session's acquisition order.
        let session_guard = self.session.as_ref().map(|s| s.lock());
        let singletons = shared.singletons.read();
        let mut outer: Vec<&InstanceSet> = vec![&self.beans];
        if let Some(guard) = session_guard.as_ref() {
            outer.push(&**guard);
        }
        outer.push(&*singletons);

        let mut stack = Vec::new();
        let mut resolution = Resolution::new(
            &shared.descriptors,
            category,
            &mut self.request_set,
            &outer,
            &mut stack,
        );
        resolution.build(index)
    }
}
