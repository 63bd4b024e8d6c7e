//! Application fault classification for exception-listener dispatch.

use crate::error::CoreError;
use crate::key::{key_of_type, Key};

/// An application fault that can be matched against fault bindings.
///
/// Rust has no exception hierarchy to walk, so each fault declares its
/// classification explicitly: an exact key (its own type), an optional
/// lineage of broader fault keys it belongs to, and an optional wrapped
/// cause. Fault lookup prefers an exact match over a lineage match at
/// the same chain level, and only then descends into the cause.
///
/// # Examples
///
/// ```rust
/// use std::fmt;
/// use switchboard::{key_of_type, Fault, Key};
///
/// // Marker type standing in for a broader fault class.
/// #[derive(Debug)]
/// struct StorageFault;
/// impl fmt::Display for StorageFault {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "storage fault")
///     }
/// }
/// impl std::error::Error for StorageFault {}
/// impl Fault for StorageFault {
///     fn key(&self) -> Key {
///         key_of_type::<StorageFault>()
///     }
/// }
///
/// #[derive(Debug)]
/// struct MissingRow(u64);
/// impl fmt::Display for MissingRow {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "row {} not found", self.0)
///     }
/// }
/// impl std::error::Error for MissingRow {}
/// impl Fault for MissingRow {
///     fn key(&self) -> Key {
///         key_of_type::<MissingRow>()
///     }
///     fn lineage(&self) -> Vec<Key> {
///         vec![key_of_type::<StorageFault>()]
///     }
/// }
/// ```
pub trait Fault: std::error::Error + Send + Sync + 'static {
    /// The fault's exact key; implementors return
    /// `key_of_type::<Self>()`.
    fn key(&self) -> Key;

    /// Broader fault keys this fault belongs to, matched only when no
    /// exact binding exists at the same chain level.
    fn lineage(&self) -> Vec<Key> {
        Vec::new()
    }

    /// The wrapped cause, if this fault wraps another one.
    fn cause(&self) -> Option<&dyn Fault> {
        None
    }
}

// Engine-level failures re-enter fault dispatch like any application
// fault; an `ActionInvocation` wrapper exposes the handler's own fault
// as its cause so cause-chain matching reaches it.
impl Fault for CoreError {
    fn key(&self) -> Key {
        key_of_type::<CoreError>()
    }

    fn cause(&self) -> Option<&dyn Fault> {
        match self {
            CoreError::ActionInvocation(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}
