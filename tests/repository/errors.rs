//! Status mapping and server validation errors.

use restmodel::{Method, Outcome, Record, RepositoryError, ResponseError};
use serde_json::{json, Value};

use crate::support::{attrs, foobar_registry, Foobar};

fn persisted_one() -> Record<Foobar> {
    Record::from_remote(attrs(json!({ "id": 1, "name": "one" }))).unwrap()
}

#[test]
fn unauthorized_create_is_an_error() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Post, "foobars", 401, Value::Null);
    let foobars = registry.repository::<Foobar>().unwrap();

    let err = foobars.save(&mut Record::new(Foobar::named("x"))).unwrap_err();

    assert!(matches!(
        err.response_error(),
        Some(ResponseError::Unauthorized(_))
    ));
}

#[test]
fn not_found_update_is_an_error() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Put, "foobars/1", 404, json!({ "error": "gone" }));
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = persisted_one();
    record.name = "uno".into();
    let err = foobars.save(&mut record).unwrap_err();

    let response_error = err.response_error().unwrap();
    assert!(matches!(response_error, ResponseError::NotFound(_)));
    assert_eq!(response_error.response().body, json!({ "error": "gone" }));
}

#[test]
fn rejected_create_keeps_the_record_new_and_collects_errors() {
    let (stub, registry) = foobar_registry();
    stub.on(
        Method::Post,
        "foobars",
        422,
        json!({ "errors": {
            "name": ["can't be blank", "is too short"],
            "base": ["Quota exceeded"],
            "owner_id": ["must exist"]
        }}),
    );
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = Record::new(Foobar::named(""));
    let outcome = foobars.save(&mut record).unwrap();

    let Outcome::Rejected(messages) = outcome else {
        panic!("expected rejection");
    };
    assert_eq!(messages.len(), 3);
    assert!(!record.is_persisted());
    assert_eq!(record.errors().get("name"), ["can't be blank", "is too short"]);
    assert_eq!(record.errors().base(), ["Quota exceeded", "Owner must exist"]);
    assert_eq!(
        record.errors().full_messages(),
        vec![
            "Name can't be blank",
            "Name is too short",
            "Quota exceeded",
            "Owner must exist"
        ]
    );
}

#[test]
fn rejected_update_merges_the_same_errors_once() {
    let (stub, registry) = foobar_registry();
    stub.on(
        Method::Put,
        "foobars/1",
        422,
        json!({ "errors": { "name": ["is taken"], "color": ["is ugly"] } }),
    );
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = persisted_one();
    record.name = "two".into();
    assert!(foobars.save(&mut record).unwrap().is_rejected());
    assert!(foobars.save(&mut record).unwrap().is_rejected());

    assert_eq!(stub.count(Method::Put), 2);
    assert_eq!(record.errors().get("name"), ["is taken"]);
    assert_eq!(record.errors().base(), ["Color is ugly"]);
    assert_eq!(record.errors().len(), 2);
}

#[test]
fn rejection_without_errors_key_has_no_messages() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Post, "foobars", 422, json!({ "message": "nope" }));
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut record = Record::new(Foobar::named("x"));
    let outcome = foobars.save(&mut record).unwrap();

    assert_eq!(outcome, Outcome::Rejected(Vec::new()));
    assert!(record.errors().is_empty());
}

#[test]
fn unexpected_status_surfaces_with_its_response() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Get, "foobars/7", 503, json!({ "retry_in": 5 }));
    let foobars = registry.repository::<Foobar>().unwrap();

    let err = foobars.find("7").unwrap_err();

    assert_eq!(err.to_string(), "server returned unhandled status 503");
    assert_eq!(err.response_error().map(ResponseError::status), Some(503));
}

#[test]
fn transport_failures_are_not_response_errors() {
    let (_, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    // Nothing scripted for this URL, so the stub fails to connect.
    let err = foobars.find("404").unwrap_err();

    assert!(matches!(err, RepositoryError::Adapter(_)));
    assert!(err.response_error().is_none());
}

#[test]
fn malformed_body_is_an_unpack_error() {
    let (stub, registry) = foobar_registry();
    stub.on(Method::Get, "foobars/8", 200, json!({ "something_else": {} }));
    let foobars = registry.repository::<Foobar>().unwrap();

    let err = foobars.find("8").unwrap_err();

    assert!(err.to_string().starts_with("unable to unpack Foobar attributes"));
}
