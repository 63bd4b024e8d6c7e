//! Route indexing and selection.

mod common;

use common::TestRequest;
use switchboard::{Container, CoreError, Engine, Inventory, Lifetime, RouteIndex};

struct ItemController;

fn container() -> Container {
    let mut inventory = Inventory::new();
    inventory.add_service::<ItemController, _>(Lifetime::Singleton, |_| Ok(ItemController));
    inventory.build().unwrap()
}

fn label_route(builder: &mut switchboard::RouteIndexBuilder, template: &str, label: &'static str) {
    builder
        .route("GET", template)
        .handle::<ItemController, _, _>(move |_ctrl, _args| Ok(label));
}

fn dispatched_label(engine: &Engine, method: &str, path: &str) -> &'static str {
    let request = TestRequest::new(method, path).into_arc();
    let mut scope = engine.scope(&request).unwrap();
    let invocation = engine.dispatch_route(&mut scope, &request).unwrap();
    *invocation.value.downcast::<&'static str>().unwrap()
}

#[test]
fn earlier_registration_wins_when_patterns_overlap() {
    common::init_tracing();
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items/special", "specific");
    label_route(&mut builder, "/items/{id}", "generic");
    let engine = Engine::new(container(), builder.build().unwrap());

    assert_eq!(dispatched_label(&engine, "GET", "/items/special"), "specific");
    assert_eq!(dispatched_label(&engine, "GET", "/items/7"), "generic");
}

#[test]
fn registration_order_wins_even_over_the_more_specific_pattern() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items/{id}", "generic");
    label_route(&mut builder, "/items/special", "specific");
    let engine = Engine::new(container(), builder.build().unwrap());

    assert_eq!(dispatched_label(&engine, "GET", "/items/special"), "generic");
}

#[test]
fn method_matching_is_case_insensitive() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items", "listing");
    let engine = Engine::new(container(), builder.build().unwrap());

    assert_eq!(dispatched_label(&engine, "get", "/items"), "listing");
}

#[test]
fn unmatched_request_is_route_not_found() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items", "listing");
    let engine = Engine::new(container(), builder.build().unwrap());

    let request = TestRequest::new("post", "/items").into_arc();
    let mut scope = engine.scope(&request).unwrap();
    match engine.dispatch_route(&mut scope, &request) {
        Err(CoreError::RouteNotFound { method, path }) => {
            assert_eq!(method, "POST");
            assert_eq!(path, "/items");
        }
        other => panic!("expected RouteNotFound, got {:?}", other.err()),
    }
}

#[test]
fn identical_templates_under_one_method_are_rejected() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items/{id}", "first");
    label_route(&mut builder, "/items/{id}", "second");

    assert!(matches!(
        builder.build(),
        Err(CoreError::DuplicateRoute { .. })
    ));
}

#[test]
fn identical_templates_under_different_methods_coexist() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/items/{id}", "read");
    builder
        .route("DELETE", "/items/{id}")
        .handle::<ItemController, _, _>(|_ctrl, _args| Ok("delete"));
    let engine = Engine::new(container(), builder.build().unwrap());

    assert_eq!(dispatched_label(&engine, "GET", "/items/3"), "read");
    assert_eq!(dispatched_label(&engine, "DELETE", "/items/3"), "delete");
}

#[test]
fn declared_path_param_must_exist_in_the_template() {
    let mut builder = RouteIndex::builder();
    builder
        .route("GET", "/items")
        .path_param::<i64>("id")
        .handle::<ItemController, _, _>(|_ctrl, _args| Ok(()));

    assert!(matches!(
        builder.build(),
        Err(CoreError::InvalidRoute { .. })
    ));
}

#[test]
fn content_type_defaults_and_overrides() {
    let mut builder = RouteIndex::builder();
    label_route(&mut builder, "/page", "page");
    builder
        .route("GET", "/data")
        .content_type("application/json")
        .handle::<ItemController, _, _>(|_ctrl, _args| Ok("{}"));
    let engine = Engine::new(container(), builder.build().unwrap());

    let request = TestRequest::get("/page");
    let mut scope = engine.scope(&request).unwrap();
    let invocation = engine.dispatch_route(&mut scope, &request).unwrap();
    assert_eq!(invocation.content_type, "text/html");

    let request = TestRequest::get("/data");
    let mut scope = engine.scope(&request).unwrap();
    let invocation = engine.dispatch_route(&mut scope, &request).unwrap();
    assert_eq!(invocation.content_type, "application/json");
}
