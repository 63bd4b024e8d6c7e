//! Service key types for registry storage and lookup.

use std::any::TypeId;

/// Key for service storage and lookup.
///
/// Keys identify services, capabilities, and fault classes in the
/// registry. Concrete types carry their `TypeId` for fast comparison
/// plus the type name for diagnostics; trait capabilities only have a
/// name, since trait objects carry no `TypeId` of their own.
///
/// # Examples
///
/// ```rust
/// use switchboard::{key_of_type, key_of_trait, Key};
///
/// trait Mailer: Send + Sync {}
///
/// let concrete = key_of_type::<String>();
/// let capability = key_of_trait::<dyn Mailer>();
///
/// assert_eq!(concrete.display_name(), "alloc::string::String");
/// assert!(capability.display_name().contains("Mailer"));
/// assert_ne!(concrete, capability);
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics.
    Type(TypeId, &'static str),
    /// Capability (trait) key, identified by the trait's type name.
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }
}

// TypeId-only comparison for concrete types; the name is diagnostics.
impl PartialEq for Key {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Key for a concrete service type.
#[inline]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Key for a capability trait, e.g. `key_of_trait::<dyn Mailer>()`.
#[inline]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Cap {}

    #[test]
    fn type_keys_compare_by_type_id() {
        assert_eq!(key_of_type::<u32>(), key_of_type::<u32>());
        assert_ne!(key_of_type::<u32>(), key_of_type::<i32>());
    }

    #[test]
    fn trait_and_type_keys_never_equal() {
        assert_ne!(key_of_trait::<dyn Cap>(), key_of_type::<u32>());
    }
}
