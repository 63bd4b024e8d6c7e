//! The dispatch engine: route selection, parameter binding, and action
//! invocation over a container and a route index.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::binding::{ArgValue, Args};
use crate::coerce::{coerce, Scalar};
use crate::container::Container;
use crate::error::{CoreError, CoreResult};
use crate::fault::Fault;
use crate::key::key_of_trait;
use crate::lifetime::Lifetime;
use crate::registry::AnyArc;
use crate::request::Request;
use crate::routing::{ActionValue, Handler, ParamSpec, RouteBinding, RouteIndex};
use crate::scope::DispatchScope;

/// Result of one successful action invocation: the type-erased action
/// value and the content type the rendering layer should emit.
pub struct Invocation {
    pub value: ActionValue,
    pub content_type: String,
}

/// The request-processing core. One engine serves the whole process;
/// each dispatch runs against its own [`DispatchScope`].
pub struct Engine {
    container: Container,
    index: RouteIndex,
}

impl Engine {
    pub fn new(container: Container, index: RouteIndex) -> Self {
        Self { container, index }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Open the dispatch scope for one request: attaches the session
    /// (when the request carries an id) and registers the request
    /// itself as a `dyn Request` platform bean.
    pub fn scope(&self, request: &Arc<dyn Request>) -> CoreResult<DispatchScope> {
        let mut scope = DispatchScope::new(&self.container, request.session_id())?;
        scope.add_bean_trait::<dyn Request>(request.clone());
        Ok(scope)
    }

    /// Dispatch one request: rebuild request-scoped services, select
    /// the first matching route in registration order, bind parameters,
    /// and invoke the action.
    pub fn dispatch_route(
        &self,
        scope: &mut DispatchScope,
        request: &Arc<dyn Request>,
    ) -> CoreResult<Invocation> {
        scope.reload_request()?;
        let binding = self
            .index
            .find_route(request.method(), request.path())
            .ok_or_else(|| CoreError::RouteNotFound {
                method: request.method().to_ascii_uppercase(),
                path: request.path().to_string(),
            })?;
        debug!(
            method = %binding.method,
            template = %binding.template,
            path = request.path(),
            "route selected"
        );
        let path_vars = extract_path_vars(binding, request.path())?;
        self.invoke(scope, &binding.handler, &path_vars, request.body_params())
    }

    /// Dispatch a fault to its listener, if one is bound.
    ///
    /// The fault is registered as a platform bean under its exact key,
    /// its lineage keys, and the `dyn Fault` trait key, so the listener
    /// can take it as a `bean_trait::<dyn Fault>` parameter. The
    /// request-scoped set is left exactly as the failed action saw it;
    /// only the listener's own controller is rebuilt when it is
    /// request-scoped. Returns `Ok(None)` when no binding matches
    /// anywhere on the cause chain.
    pub fn dispatch_fault(
        &self,
        scope: &mut DispatchScope,
        fault: Arc<dyn Fault>,
    ) -> CoreResult<Option<Invocation>> {
        let wrapped: AnyArc = Arc::new(fault.clone());
        scope.add_bean_keyed(fault.key(), wrapped.clone());
        for key in fault.lineage() {
            scope.add_bean_keyed(key, wrapped.clone());
        }
        scope.add_bean_keyed(key_of_trait::<dyn Fault>(), wrapped);

        let binding = match self.index.find_fault(fault.as_ref()) {
            Some(binding) => binding,
            None => return Ok(None),
        };
        debug!(
            fault = binding.fault_key.display_name(),
            "fault listener selected"
        );
        self.invoke(scope, &binding.handler, &HashMap::new(), &HashMap::new())
            .map(Some)
    }

    /// Reload one lifecycle category. `Singleton` rebuilds the
    /// process-wide set; `Session` rebuilds the named session (a `None`
    /// id is a no-op); `Request` is a no-op here because request state
    /// is rebuilt by every dispatch anyway.
    pub fn reload(&self, category: Lifetime, session_id: Option<&str>) -> CoreResult<()> {
        match category {
            Lifetime::Singleton => self.container.reload_singletons(),
            Lifetime::Session => match session_id {
                Some(id) => self.container.reload_session(id),
                None => Ok(()),
            },
            Lifetime::Request => Ok(()),
        }
    }

    /// Resolve the controller, assemble the argument pack in declared
    /// order, and run the action closure.
    fn invoke(
        &self,
        scope: &mut DispatchScope,
        handler: &Handler,
        path_vars: &HashMap<&'static str, Scalar>,
        body: &HashMap<String, String>,
    ) -> CoreResult<Invocation> {
        let controller_lifetime = self
            .container
            .descriptor_for(&handler.controller)
            .map(|d| d.lifetime());
        let controller = match controller_lifetime {
            Some(Lifetime::Request) => scope.reload_handler(&handler.controller)?,
            _ => scope
                .live_find(&handler.controller)
                .ok_or(CoreError::DependencyUnresolved(
                    handler.controller.display_name(),
                ))?,
        };

        let mut args = Vec::with_capacity(handler.params.len());
        for spec in &handler.params {
            match spec {
                ParamSpec::Path { name, .. } => {
                    let value = path_vars
                        .get(name)
                        .cloned()
                        .ok_or(CoreError::PathVariableMissing(*name))?;
                    args.push(ArgValue::Scalar(value));
                }
                ParamSpec::Bean(key) => {
                    let value = scope
                        .bean(key)
                        .ok_or(CoreError::DependencyUnresolved(key.display_name()))?;
                    args.push(ArgValue::Bean(value));
                }
                ParamSpec::Model(plan) => {
                    args.push(ArgValue::Model(Some(plan.populate(body)?)));
                }
            }
        }

        let value =
            (handler.action)(controller, Args(args)).map_err(CoreError::ActionInvocation)?;
        Ok(Invocation {
            value,
            content_type: handler.content_type.clone(),
        })
    }
}

/// Coerce every declared path variable out of the matched path.
fn extract_path_vars(
    binding: &RouteBinding,
    path: &str,
) -> CoreResult<HashMap<&'static str, Scalar>> {
    let mut vars = HashMap::new();
    let captures = match binding.pattern.captures(path) {
        Some(captures) => captures,
        None => return Ok(vars),
    };
    for spec in &binding.handler.params {
        if let ParamSpec::Path { name, kind } = spec {
            if let Some(matched) = captures.name(name) {
                vars.insert(*name, coerce(*kind, matched.as_str())?);
            }
        }
    }
    Ok(vars)
}
