//! Adapter and repository resolution through the registry.

use std::sync::Arc;

use restmodel::{Method, Registry, Repository, RepositoryError, StubTransport};

use crate::support::{foobar_registry, Bar, Foobar};

#[test]
fn unknown_adapter_resolves_to_none_without_memoizing() {
    let (_, registry) = foobar_registry();
    registry.adapter("Foobar").unwrap();
    let memoized = registry.adapters().memoized();

    assert!(registry.adapter("Nothing::Here").unwrap().is_none());
    assert_eq!(registry.adapters().memoized(), memoized);
}

#[test]
fn adapters_resolve_by_model_name_or_key() {
    let (_, registry) = foobar_registry();

    let by_name = registry.adapter("Foo::Bar").unwrap().unwrap();
    let by_key = registry.adapter("foo/bar").unwrap().unwrap();

    assert!(Arc::ptr_eq(&by_name, &by_key));
}

#[test]
fn repositories_are_shared_until_reset_clears_them() {
    let (stub, registry) = foobar_registry();

    registry.repository::<Foobar>().unwrap().all().unwrap();
    registry.repository::<Foobar>().unwrap().all().unwrap();
    assert_eq!(stub.count(Method::Get), 1);

    registry.reset();
    registry.repository::<Foobar>().unwrap().all().unwrap();
    assert_eq!(stub.count(Method::Get), 2);
}

#[test]
fn reset_clears_every_registered_repository() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Get, "foo/bars", 200, serde_json::json!({ "bars": [] }));

    let foobars = registry.repository::<Foobar>().unwrap();
    let bars = registry.repository::<Bar>().unwrap();
    foobars.all().unwrap();
    bars.all().unwrap();
    assert_eq!(registry.repositories(), vec!["foobar", "foo/bar"]);

    registry.reset();

    assert!(!foobars.is_cached());
    assert!(!bars.is_cached());
    assert_eq!(registry.adapters().memoized(), 0);
}

#[test]
fn unit_of_work_scopes_the_cache() {
    let (stub, registry) = foobar_registry();

    for _ in 0..3 {
        let _unit = registry.unit_of_work();
        let foobars = registry.repository::<Foobar>().unwrap();
        foobars.all().unwrap();
        foobars.find("1").unwrap();
        foobars.all().unwrap();
    }

    assert_eq!(stub.count(Method::Get), 3);
}

#[test]
fn repository_without_adapter_reports_it() {
    let registry = Registry::builder()
        .default_connection(Arc::new(StubTransport::new()))
        .build();

    let foobars = registry.repository::<Foobar>().unwrap();
    let err = foobars.all().unwrap_err();

    assert_eq!(err, RepositoryError::MissingAdapter("foobar".into()));
}

#[test]
fn repository_named_by_type_uses_its_own_adapter() {
    let (_, registry) = foobar_registry();

    let tests = Repository::<Foobar>::named(registry.adapters().clone(), "TestRepository");
    assert_eq!(tests.resource(), "test");
    assert!(tests.adapter().is_err());

    let bars = Repository::<Foobar>::named(registry.adapters().clone(), "Foo::BarRepository");
    assert_eq!(bars.resource(), "foo/bar");
    assert!(bars.adapter().is_ok());
}
