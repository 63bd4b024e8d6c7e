//! Ordered live-instance storage.

use std::any::Any;
use std::sync::Arc;

use crate::key::Key;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// One live service instance or platform bean, registered under its
/// concrete key (capability entries get their own rows, sharing the
/// underlying allocation).
pub(crate) struct LiveInstance {
    pub(crate) key: Key,
    pub(crate) value: AnyArc,
}

/// An ordered set of live instances.
///
/// Iteration order is insertion order and stays stable within a
/// resolution, which keeps parameter binding deterministic. At most one
/// entry exists per key; inserting an existing key replaces the entry
/// in place so reloads do not shuffle lookup order.
#[derive(Default)]
pub(crate) struct InstanceSet {
    entries: Vec<LiveInstance>,
}

impl InstanceSet {
    pub(crate) fn find(&self, key: &Key) -> Option<&AnyArc> {
        self.entries
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    pub(crate) fn insert(&mut self, key: Key, value: AnyArc) {
        if let Some(pos) = self.entries.iter().position(|e| e.key == key) {
            self.entries[pos] = LiveInstance { key, value };
        } else {
            self.entries.push(LiveInstance { key, value });
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;

    #[test]
    fn insert_replaces_in_place() {
        let mut set = InstanceSet::default();
        set.insert(key_of_type::<u32>(), Arc::new(1u32));
        set.insert(key_of_type::<String>(), Arc::new("x".to_string()));
        set.insert(key_of_type::<u32>(), Arc::new(2u32));

        assert_eq!(set.len(), 2);
        let found = set.find(&key_of_type::<u32>()).unwrap();
        assert_eq!(*found.clone().downcast::<u32>().unwrap(), 2);
    }
}
