//! Binding models and the handler argument pack.
//!
//! Runtime field reflection is replaced by an explicit, statically
//! declared plan: a default constructor plus a table of field setters.
//! Population runs per invocation and the resulting model is never
//! cached.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::coerce::{coerce, FromScalar, Scalar, ScalarKind};
use crate::error::CoreResult;
use crate::registry::AnyArc;

type MakeFn = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;
type SetFn = Arc<dyn Fn(&mut dyn Any, Scalar) + Send + Sync>;

#[derive(Clone)]
pub(crate) struct FieldBinding {
    name: &'static str,
    kind: ScalarKind,
    set: SetFn,
}

/// Declared construction-and-population plan for a binding model.
///
/// # Examples
///
/// ```rust
/// use switchboard::BindingPlan;
///
/// #[derive(Default)]
/// struct SignupForm {
///     name: String,
///     age: i32,
///     email: String,
/// }
///
/// let plan = BindingPlan::of::<SignupForm>()
///     .field("name", |m: &mut SignupForm, v: String| m.name = v)
///     .field("age", |m: &mut SignupForm, v: i32| m.age = v)
///     .field("email", |m: &mut SignupForm, v: String| m.email = v)
///     .plan();
/// # let _ = plan;
/// ```
#[derive(Clone)]
pub struct BindingPlan {
    make: MakeFn,
    fields: Vec<FieldBinding>,
}

impl BindingPlan {
    /// Start declaring a plan for model type `M`.
    pub fn of<M: Default + Send + 'static>() -> ModelBinder<M> {
        ModelBinder {
            fields: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Construct a default instance and, only when the request carries
    /// body parameters, populate every declared field whose name
    /// matches a body key. Unmatched fields keep their default value;
    /// an unparsable value is a `CoercionFailure`, never a default.
    pub(crate) fn populate(
        &self,
        body: &HashMap<String, String>,
    ) -> CoreResult<Box<dyn Any + Send>> {
        let mut model = (self.make)();
        if body.is_empty() {
            return Ok(model);
        }
        for field in &self.fields {
            if let Some(raw) = body.get(field.name) {
                let value = coerce(field.kind, raw)?;
                (field.set)(model.as_mut(), value);
            }
        }
        Ok(model)
    }
}

/// Typed builder for a [`BindingPlan`].
pub struct ModelBinder<M> {
    fields: Vec<FieldBinding>,
    _model: PhantomData<M>,
}

impl<M: Default + Send + 'static> ModelBinder<M> {
    /// Declare one populatable field: its body-parameter name, target
    /// type (fixing the coercion), and setter.
    pub fn field<V: FromScalar + 'static>(
        mut self,
        name: &'static str,
        apply: fn(&mut M, V),
    ) -> Self {
        let set: SetFn = Arc::new(move |model: &mut dyn Any, scalar: Scalar| {
            if let (Some(model), Some(value)) = (model.downcast_mut::<M>(), V::from_scalar(scalar))
            {
                apply(model, value);
            }
        });
        self.fields.push(FieldBinding {
            name,
            kind: V::KIND,
            set,
        });
        self
    }

    pub fn plan(self) -> BindingPlan {
        BindingPlan {
            make: Arc::new(|| Box::new(M::default())),
            fields: self.fields,
        }
    }
}

/// One assembled handler argument.
pub(crate) enum ArgValue {
    Scalar(Scalar),
    Bean(AnyArc),
    Model(Option<Box<dyn Any + Send>>),
}

/// The ordered argument pack handed to an action closure, mirroring the
/// binding's declared parameter plan.
pub struct Args(pub(crate) Vec<ArgValue>);

impl Args {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn scalar(&self, index: usize) -> Option<&Scalar> {
        match self.0.get(index) {
            Some(ArgValue::Scalar(s)) => Some(s),
            _ => None,
        }
    }

    /// A string path variable or field at `index`.
    pub fn str(&self, index: usize) -> Option<&str> {
        self.scalar(index).and_then(Scalar::as_str)
    }

    /// A signed-integer path variable at `index`, widened to `i64`.
    pub fn i64(&self, index: usize) -> Option<i64> {
        self.scalar(index).and_then(Scalar::as_i64)
    }

    /// A floating-point path variable at `index`, widened to `f64`.
    pub fn f64(&self, index: usize) -> Option<f64> {
        self.scalar(index).and_then(Scalar::as_f64)
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        self.scalar(index).and_then(Scalar::as_bool)
    }

    /// A platform bean bound by concrete type.
    pub fn bean<T: Send + Sync + 'static>(&self, index: usize) -> Option<Arc<T>> {
        match self.0.get(index) {
            Some(ArgValue::Bean(any)) => any.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// A platform bean bound by trait key, e.g.
    /// `args.bean_trait::<dyn Request>(1)`.
    pub fn bean_trait<T: ?Sized + Send + Sync + 'static>(&self, index: usize) -> Option<Arc<T>> {
        match self.0.get(index) {
            Some(ArgValue::Bean(any)) => any.downcast_ref::<Arc<T>>().cloned(),
            _ => None,
        }
    }

    /// Take the populated binding model at `index`. Models are moved
    /// out, so a second take returns `None`.
    pub fn model<M: 'static>(&mut self, index: usize) -> Option<M> {
        match self.0.get_mut(index) {
            Some(ArgValue::Model(slot)) => slot
                .take()
                .and_then(|boxed| boxed.downcast::<M>().ok())
                .map(|boxed| *boxed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Form {
        name: String,
        age: i32,
    }

    fn plan() -> BindingPlan {
        BindingPlan::of::<Form>()
            .field("name", |m: &mut Form, v: String| m.name = v)
            .field("age", |m: &mut Form, v: i32| m.age = v)
            .plan()
    }

    #[test]
    fn empty_body_keeps_defaults() {
        let body = HashMap::new();
        let model = plan().populate(&body).unwrap();
        let form = model.downcast::<Form>().unwrap();
        assert_eq!(form.name, "");
        assert_eq!(form.age, 0);
    }

    #[test]
    fn matching_keys_populate_fields() {
        let mut body = HashMap::new();
        body.insert("name".to_string(), "Alice".to_string());
        body.insert("age".to_string(), "30".to_string());
        let model = plan().populate(&body).unwrap();
        let form = model.downcast::<Form>().unwrap();
        assert_eq!(form.name, "Alice");
        assert_eq!(form.age, 30);
    }

    #[test]
    fn unparsable_field_fails_population() {
        let mut body = HashMap::new();
        body.insert("age".to_string(), "thirty".to_string());
        assert!(plan().populate(&body).is_err());
    }
}
