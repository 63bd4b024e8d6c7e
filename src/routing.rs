//! Route and fault-listener bindings, indexed for dispatch.
//!
//! Templates compile to anchored regexes at build time; matching at
//! dispatch time is a linear scan in registration order, so when two
//! patterns both match a path the earlier registration wins. Textually
//! identical patterns under one method are rejected outright.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::binding::{Args, BindingPlan};
use crate::coerce::{FromScalar, ScalarKind};
use crate::error::{CoreError, CoreResult};
use crate::fault::Fault;
use crate::key::{key_of_type, Key};
use crate::registry::AnyArc;

/// Type-erased action result, carried to the rendering layer.
pub type ActionValue = Box<dyn Any + Send>;

/// Erased action closure: receives the resolved controller and the
/// assembled argument pack.
pub(crate) type ActionFn =
    Arc<dyn Fn(AnyArc, Args) -> Result<ActionValue, Arc<dyn Fault>> + Send + Sync>;

/// One declared handler parameter, bound in declaration order.
pub(crate) enum ParamSpec {
    /// A path variable, coerced to the declared scalar kind.
    Path {
        name: &'static str,
        kind: ScalarKind,
    },
    /// A platform bean from the dispatch scope.
    Bean(Key),
    /// A binding model, constructed and populated per invocation.
    Model(BindingPlan),
}

/// Controller key, parameter plan, and action closure for one binding.
pub(crate) struct Handler {
    pub(crate) controller: Key,
    pub(crate) content_type: String,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) action: ActionFn,
}

pub(crate) struct RouteBinding {
    pub(crate) method: String,
    pub(crate) template: String,
    pub(crate) pattern: Regex,
    pub(crate) handler: Handler,
}

pub(crate) struct FaultBinding {
    pub(crate) fault_key: Key,
    pub(crate) handler: Handler,
}

/// The immutable dispatch table: route bindings grouped by HTTP-style
/// method, plus fault-listener bindings in registration order.
pub struct RouteIndex {
    routes: HashMap<String, Vec<Arc<RouteBinding>>>,
    faults: Vec<Arc<FaultBinding>>,
}

impl RouteIndex {
    pub fn builder() -> RouteIndexBuilder {
        RouteIndexBuilder::default()
    }

    /// First binding under `method` whose pattern matches `path`, in
    /// registration order.
    pub(crate) fn find_route(&self, method: &str, path: &str) -> Option<&Arc<RouteBinding>> {
        let bindings = self.routes.get(&method.to_ascii_uppercase())?;
        bindings.iter().find(|b| b.pattern.is_match(path))
    }

    /// Select a fault binding by walking the cause chain outermost
    /// first. At each level an exact key match beats a lineage match;
    /// only when a level yields neither does the search descend into
    /// that fault's cause.
    pub(crate) fn find_fault(&self, fault: &dyn Fault) -> Option<&Arc<FaultBinding>> {
        let mut level: Option<&dyn Fault> = Some(fault);
        while let Some(current) = level {
            let exact = current.key();
            if let Some(binding) = self.faults.iter().find(|b| b.fault_key == exact) {
                return Some(binding);
            }
            let lineage = current.lineage();
            if let Some(binding) = self.faults.iter().find(|b| lineage.contains(&b.fault_key)) {
                return Some(binding);
            }
            // Qualified call: `Error::cause` is also in scope here.
            level = Fault::cause(current);
        }
        None
    }
}

enum BindingTarget {
    Route { method: String, template: String },
    Fault(Key),
}

/// Builder for the [`RouteIndex`].
///
/// # Examples
///
/// ```rust
/// use switchboard::RouteIndex;
///
/// struct ShelfController;
///
/// let mut builder = RouteIndex::builder();
/// builder
///     .route("GET", "/shelves/{id}")
///     .controller::<ShelfController>()
///     .path_param::<i64>("id")
///     .handle::<ShelfController, _, _>(|_ctrl, args| {
///         Ok(format!("shelf {}", args.i64(0).unwrap_or(0)))
///     });
///
/// let index = builder.build().unwrap();
/// # let _ = index;
/// ```
#[derive(Default)]
pub struct RouteIndexBuilder {
    routes: Vec<(String, String, Handler)>,
    faults: Vec<(Key, Handler)>,
}

impl RouteIndexBuilder {
    /// Begin a route binding for `method` and a path template. Template
    /// segments of the form `{name}` become path variables.
    pub fn route(&mut self, method: &str, template: &str) -> ActionBuilder<'_> {
        ActionBuilder::new(
            self,
            BindingTarget::Route {
                method: method.to_ascii_uppercase(),
                template: template.to_string(),
            },
        )
    }

    /// Begin a fault-listener binding for fault type `E`.
    pub fn fault<E: Fault>(&mut self) -> ActionBuilder<'_> {
        ActionBuilder::new(self, BindingTarget::Fault(key_of_type::<E>()))
    }

    /// Begin a fault-listener binding for an explicit fault key, e.g. a
    /// broader class key that concrete faults name in their lineage.
    pub fn fault_key(&mut self, key: Key) -> ActionBuilder<'_> {
        ActionBuilder::new(self, BindingTarget::Fault(key))
    }

    /// Compile every template and produce the immutable index.
    pub fn build(self) -> CoreResult<RouteIndex> {
        let mut routes: HashMap<String, Vec<Arc<RouteBinding>>> = HashMap::new();
        for (method, template, handler) in self.routes {
            let bindings = routes.entry(method.clone()).or_default();
            if bindings.iter().any(|b| b.template == template) {
                return Err(CoreError::DuplicateRoute { method, template });
            }
            let pattern = compile_template(&template)?;
            for spec in &handler.params {
                if let ParamSpec::Path { name, .. } = spec {
                    let declared = pattern.capture_names().any(|c| c == Some(*name));
                    if !declared {
                        return Err(CoreError::InvalidRoute {
                            template,
                            reason: "declared path parameter has no template variable",
                        });
                    }
                }
            }
            debug!(method = %method, template = %template, "route bound");
            bindings.push(Arc::new(RouteBinding {
                method,
                template,
                pattern,
                handler,
            }));
        }

        let faults = self
            .faults
            .into_iter()
            .map(|(fault_key, handler)| Arc::new(FaultBinding { fault_key, handler }))
            .collect();

        Ok(RouteIndex { routes, faults })
    }
}

/// Compile a `{name}`-style path template into an anchored regex with
/// one named capture group per variable.
fn compile_template(template: &str) -> CoreResult<Regex> {
    let invalid = |reason: &'static str| CoreError::InvalidRoute {
        template: template.to_string(),
        reason,
    };

    let mut pattern = String::from("^");
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        pattern.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| invalid("unclosed `{`"))?;
        let name = &after[..close];
        let ident = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if !ident {
            return Err(invalid("variable name must be an identifier"));
        }
        pattern.push_str(&format!("(?P<{name}>[^/]+)"));
        rest = &after[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    Regex::new(&pattern).map_err(|_| invalid("template does not compile"))
}

/// In-progress route or fault binding; finished by
/// [`handle`](ActionBuilder::handle).
pub struct ActionBuilder<'b> {
    owner: &'b mut RouteIndexBuilder,
    target: BindingTarget,
    controller: Option<Key>,
    content_type: String,
    params: Vec<ParamSpec>,
}

impl<'b> ActionBuilder<'b> {
    fn new(owner: &'b mut RouteIndexBuilder, target: BindingTarget) -> Self {
        Self {
            owner,
            target,
            controller: None,
            content_type: "text/html".to_string(),
            params: Vec::new(),
        }
    }

    /// Name the controller service this binding resolves and invokes.
    pub fn controller<C: Send + Sync + 'static>(mut self) -> Self {
        self.controller = Some(key_of_type::<C>());
        self
    }

    /// Override the default `text/html` content type.
    pub fn content_type(mut self, content_type: &str) -> Self {
        self.content_type = content_type.to_string();
        self
    }

    /// Declare a path-variable parameter, coerced to `V`.
    pub fn path_param<V: FromScalar>(mut self, name: &'static str) -> Self {
        self.params.push(ParamSpec::Path {
            name,
            kind: V::KIND,
        });
        self
    }

    /// Declare a platform-bean parameter bound by concrete type.
    pub fn bean_param<T: Send + Sync + 'static>(mut self) -> Self {
        self.params.push(ParamSpec::Bean(key_of_type::<T>()));
        self
    }

    /// Declare a platform-bean parameter bound by an explicit key, e.g.
    /// `key_of_trait::<dyn Request>()`.
    pub fn bean_param_keyed(mut self, key: Key) -> Self {
        self.params.push(ParamSpec::Bean(key));
        self
    }

    /// Declare a binding-model parameter populated from body params.
    pub fn model_param(mut self, plan: BindingPlan) -> Self {
        self.params.push(ParamSpec::Model(plan));
        self
    }

    /// Finish the binding with its action closure. The controller type
    /// `C` defaults the controller key when
    /// [`controller`](ActionBuilder::controller) was not called.
    pub fn handle<C, R, F>(self, action: F)
    where
        C: Send + Sync + 'static,
        R: Send + 'static,
        F: Fn(Arc<C>, Args) -> Result<R, Arc<dyn Fault>> + Send + Sync + 'static,
    {
        let erased: ActionFn = Arc::new(move |ctrl: AnyArc, args: Args| {
            let ctrl = ctrl
                .downcast::<C>()
                .map_err(|_| {
                    Arc::new(CoreError::TypeMismatch(std::any::type_name::<C>()))
                        as Arc<dyn Fault>
                })?;
            action(ctrl, args).map(|value| Box::new(value) as ActionValue)
        });
        let handler = Handler {
            controller: self.controller.unwrap_or_else(key_of_type::<C>),
            content_type: self.content_type,
            params: self.params,
            action: erased,
        };
        match self.target {
            BindingTarget::Route { method, template } => {
                self.owner.routes.push((method, template, handler));
            }
            BindingTarget::Fault(key) => {
                self.owner.faults.push((key, handler));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_compile_to_anchored_patterns() {
        let pattern = compile_template("/shelves/{shelf}/books/{book}").unwrap();
        let caps = pattern.captures("/shelves/3/books/42").unwrap();
        assert_eq!(&caps["shelf"], "3");
        assert_eq!(&caps["book"], "42");
        assert!(!pattern.is_match("/shelves/3/books/42/pages"));
        assert!(!pattern.is_match("/prefix/shelves/3/books/42"));
    }

    #[test]
    fn literal_segments_are_escaped() {
        let pattern = compile_template("/v1.0/items").unwrap();
        assert!(pattern.is_match("/v1.0/items"));
        assert!(!pattern.is_match("/v1x0/items"));
    }

    #[test]
    fn unclosed_variable_is_rejected() {
        assert!(matches!(
            compile_template("/shelves/{id"),
            Err(CoreError::InvalidRoute { .. })
        ));
    }

    #[test]
    fn bad_variable_name_is_rejected() {
        assert!(matches!(
            compile_template("/shelves/{1d}"),
            Err(CoreError::InvalidRoute { .. })
        ));
    }
}
