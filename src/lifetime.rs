//! Service lifecycle categories.

/// Lifecycle category controlling how long a service instance lives.
///
/// Every descriptor declares exactly one category. Instances are shared
/// by reference within their validity window and replaced, never
/// mutated, when their category is reloaded.
///
/// # Examples
///
/// ```rust
/// use switchboard::{Inventory, Lifetime};
///
/// struct Clock;
/// struct RequestTrace;
///
/// let mut inventory = Inventory::new();
/// // One instance for the whole process.
/// inventory.add_service::<Clock, _>(Lifetime::Singleton, |_| Ok(Clock));
/// // Rebuilt before every dispatch.
/// inventory.add_service::<RequestTrace, _>(Lifetime::Request, |_| Ok(RequestTrace));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// Single instance for the process, built eagerly at startup.
    Singleton,
    /// Destroyed and rebuilt before each request is dispatched.
    Request,
    /// One instance per session, rebuilt only when the owning session
    /// is reloaded explicitly.
    Session,
}
