//! Error types for the dispatch and injection core.

use std::sync::Arc;

use thiserror::Error;

use crate::fault::Fault;

/// Errors raised by the container, route index, and invocation engine.
///
/// Configuration defects (`DependencyUnresolved`, `DependencyCycle`,
/// `AmbiguousDependency`, `DuplicateRoute`, `InvalidRoute`) are meant to
/// abort startup. `RouteNotFound` is an expected per-request outcome the
/// caller renders as a 404 equivalent. `ActionInvocation` and
/// `CoercionFailure` are recoverable at the dispatch boundary by
/// re-entering fault dispatch; they are never retried and never
/// silently defaulted.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No live instance and no descriptor satisfies the requested key.
    #[error("no live instance or descriptor satisfies `{0}`")]
    DependencyUnresolved(&'static str),
    /// A descriptor's constructor reached itself again (includes path).
    #[error("dependency cycle: {}", .0.join(" -> "))]
    DependencyCycle(Vec<&'static str>),
    /// Two descriptors provide the same capability key.
    #[error("more than one provider registered for `{0}`")]
    AmbiguousDependency(&'static str),
    /// No route binding matched the request.
    #[error("no route matches {method} {path}")]
    RouteNotFound { method: String, path: String },
    /// Two bindings under one method share a textually identical
    /// pattern; which would win is undefined, so indexing rejects it.
    #[error("duplicate route pattern `{template}` under {method}")]
    DuplicateRoute { method: String, template: String },
    /// A path template could not be compiled or a declared path
    /// parameter has no matching capture group.
    #[error("invalid route template `{template}`: {reason}")]
    InvalidRoute {
        template: String,
        reason: &'static str,
    },
    /// A declared path variable was not captured by the matched
    /// pattern. Route-index validation makes this unreachable for
    /// indexed routes.
    #[error("path variable `{0}` was not captured by the matched route")]
    PathVariableMissing(&'static str),
    /// A handler, or the construction of its parameters, failed. The
    /// original fault is attached and reachable through the cause chain.
    #[error("handler invocation failed: {0}")]
    ActionInvocation(Arc<dyn Fault>),
    /// A path variable or body field could not be converted to its
    /// declared type.
    #[error("cannot coerce `{value}` into {target}")]
    CoercionFailure {
        value: String,
        target: &'static str,
    },
    /// A type-erased value did not downcast to the requested type.
    #[error("type mismatch for `{0}`")]
    TypeMismatch(&'static str),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
