//! save / update dispatch.

use restmodel::{Method, Outcome, Record, RepositoryError};
use serde_json::json;

use crate::support::{attrs, foobar_registry, init_tracing, Foobar, News};

#[test]
fn saving_a_new_record_creates_it_once() {
    init_tracing();
    let (stub, registry) = foobar_registry();
    stub.on(Method::Post, "foobars", 201, json!({ "foobar": { "id": 42, "name": "new" } }));
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = Record::new(Foobar::named("new"));
    assert!(!record.is_persisted());

    let outcome = foobars.save(&mut record).unwrap();

    assert_eq!(outcome, Outcome::Saved);
    assert_eq!(stub.count(Method::Post), 1);
    assert_eq!(stub.total(), 1);
    assert!(record.is_persisted());
    assert_eq!(record.id(), Some("42".to_string()));
}

#[test]
fn saving_an_unchanged_record_does_not_touch_the_network() {
    let (stub, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = Record::<Foobar>::from_remote(attrs(json!({ "id": 1, "name": "one" }))).unwrap();
    let outcome = foobars.save(&mut record).unwrap();

    assert!(outcome.is_saved());
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(stub.total(), 0);
}

#[test]
fn saving_a_changed_record_updates_it_once() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Put, "foobars/1", 200, json!({ "foobar": { "id": 1, "name": "uno" } }));
    let foobars = registry.repository::<Foobar>().unwrap();

    foobars.all().unwrap();
    let mut record = foobars.find("1").unwrap();
    record.name = "uno".into();
    assert_eq!(record.changed().unwrap(), vec!["name"]);

    assert_eq!(foobars.save(&mut record).unwrap(), Outcome::Saved);
    assert_eq!(stub.count(Method::Put), 1);
    assert_eq!(
        stub.last_request().unwrap().body,
        Some(json!({ "id": 1, "name": "uno" }))
    );
    assert!(!record.has_changes().unwrap());
}

#[test]
fn update_with_params_sends_the_merged_record() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Put, "foobars/2", 200, json!({ "foobar": { "id": 2, "name": "dos" } }));
    let foobars = registry.repository::<Foobar>().unwrap();

    foobars.all().unwrap();
    let mut record = foobars.find("2").unwrap();
    let outcome = foobars
        .update(&mut record, Some(&attrs(json!({ "name": "dos" }))))
        .unwrap();

    assert_eq!(outcome, Outcome::Saved);
    assert_eq!(record.name, "dos");
    assert_eq!(stub.last_request().unwrap().url, "foobars/2");
}

#[test]
fn update_of_a_new_record_is_refused() {
    let (stub, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = Record::new(Foobar::named("nobody"));
    let err = foobars.update(&mut record, None).unwrap_err();

    assert_eq!(err, RepositoryError::NotPersisted("Foobar"));
    assert_eq!(stub.total(), 0);
}

#[test]
fn member_actions_post_to_the_member_path() {
    let (stub, registry) = foobar_registry();
    stub.on(
        Method::Post,
        "foobars/3/archive",
        201,
        json!({ "foobar": { "id": 3, "name": "three (archived)" } }),
    );
    let foobars = registry.repository::<Foobar>().unwrap();

    let archived = foobars.post("3", "archive").unwrap();

    assert_eq!(archived.name, "three (archived)");
    assert_eq!(stub.last_request().unwrap().body, None);
}

#[test]
fn uncountable_models_round_trip() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Post, "news", 201, json!({ "news": { "id": 2, "headline": "Rust 2.0" } }));
    stub.on(Method::Get, "news/1", 200, json!({ "news": { "id": 1, "headline": "Hello" } }));
    let news = registry.repository::<News>().unwrap();

    let mut record = Record::new(News {
        id: None,
        headline: "Rust 2.0".into(),
    });
    assert_eq!(news.save(&mut record).unwrap(), Outcome::Saved);
    assert_eq!(record.id, Some(2));

    assert_eq!(news.find("1").unwrap().headline, "Hello");
}
