//! Request-processing core: a lifecycle-aware dependency container and
//! an action routing and invocation engine.
//!
//! Services are declared in an [`Inventory`] with one of three
//! lifecycle categories (singleton, session, request) and constructors
//! that pull their dependencies through a [`Resolution`]. Building the
//! inventory validates it and eagerly constructs every singleton.
//! Routes and fault listeners are declared in a [`RouteIndex`]; the
//! [`Engine`] matches an inbound [`Request`] against them, rebuilds the
//! request-scoped services, binds path variables, platform beans, and
//! body-populated models, and invokes the bound action on its resolved
//! controller.
//!
//! The crate never touches sockets or wire formats. Callers parse the
//! request, implement [`Request`] over it, and render the returned
//! [`Invocation`] themselves.
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use switchboard::{Engine, Inventory, Lifetime, Request, RouteIndex};
//!
//! struct Greeter {
//!     prefix: String,
//! }
//!
//! struct HelloController {
//!     greeter: Arc<Greeter>,
//! }
//!
//! struct Req {
//!     body: HashMap<String, String>,
//! }
//!
//! impl Request for Req {
//!     fn method(&self) -> &str {
//!         "GET"
//!     }
//!     fn url(&self) -> &str {
//!         "/hello/42"
//!     }
//!     fn path(&self) -> &str {
//!         "/hello/42"
//!     }
//!     fn content_length(&self) -> usize {
//!         0
//!     }
//!     fn body_params(&self) -> &HashMap<String, String> {
//!         &self.body
//!     }
//!     fn session_id(&self) -> Option<&str> {
//!         None
//!     }
//! }
//!
//! let mut inventory = Inventory::new();
//! inventory
//!     .add_service::<Greeter, _>(Lifetime::Singleton, |_| {
//!         Ok(Greeter { prefix: "hello".to_string() })
//!     })
//!     .add_service::<HelloController, _>(Lifetime::Request, |r| {
//!         Ok(HelloController { greeter: r.get::<Greeter>()? })
//!     });
//! let container = inventory.build().unwrap();
//!
//! let mut routes = RouteIndex::builder();
//! routes
//!     .route("GET", "/hello/{id}")
//!     .path_param::<i64>("id")
//!     .handle::<HelloController, _, _>(|ctrl, args| {
//!         Ok(format!("{} #{}", ctrl.greeter.prefix, args.i64(0).unwrap_or(0)))
//!     });
//! let engine = Engine::new(container, routes.build().unwrap());
//!
//! let request: Arc<dyn Request> = Arc::new(Req { body: HashMap::new() });
//! let mut scope = engine.scope(&request).unwrap();
//! let invocation = engine.dispatch_route(&mut scope, &request).unwrap();
//!
//! assert_eq!(invocation.content_type, "text/html");
//! let rendered = invocation.value.downcast::<String>().unwrap();
//! assert_eq!(*rendered, "hello #42");
//! ```

mod binding;
mod coerce;
mod container;
mod descriptors;
mod engine;
mod error;
mod fault;
mod inventory;
mod key;
mod lifecycle;
mod lifetime;
mod registry;
mod request;
mod resolve;
mod routing;
mod scope;

pub use binding::{Args, BindingPlan, ModelBinder};
pub use coerce::{coerce, FromScalar, Scalar, ScalarKind};
pub use container::Container;
pub use descriptors::ServiceDescriptor;
pub use engine::{Engine, Invocation};
pub use error::{CoreError, CoreResult};
pub use fault::Fault;
pub use inventory::Inventory;
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use registry::AnyArc;
pub use request::{Request, Response};
pub use resolve::Resolution;
pub use routing::{ActionBuilder, ActionValue, RouteIndex, RouteIndexBuilder};
pub use scope::DispatchScope;
