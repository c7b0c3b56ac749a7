//! Snapshot behaviour of `all`, `find` and `filter`.

use restmodel::{Method, Options};
use serde_json::json;

use crate::support::{foobar_registry, Bar, Foobar};

#[test]
fn all_twice_is_one_request() {
    let (stub, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    let first = foobars.all().unwrap();
    let second = foobars.all().unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first.items(), second.items());
    assert_eq!(stub.count(Method::Get), 1);
}

#[test]
fn clear_cache_forces_a_second_request() {
    let (stub, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    foobars.all().unwrap();
    foobars.clear_cache();
    foobars.all().unwrap();

    assert_eq!(stub.count(Method::Get), 2);
}

#[test]
fn find_after_all_is_served_locally() {
    let (stub, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    foobars.all().unwrap();
    let two = foobars.find("2").unwrap();

    assert_eq!(two.name, "two");
    assert_eq!(stub.total(), 1);
}

#[test]
fn returned_records_do_not_alias_the_snapshot() {
    let (_, registry) = foobar_registry();
    let foobars = registry.repository::<Foobar>().unwrap();

    let mut all = foobars.all().unwrap().into_vec();
    all[0].name = "changed locally".into();

    assert_eq!(foobars.find("1").unwrap().name, "one");
}

#[test]
fn filter_is_conjunctive_and_ordered() {
    let (stub, registry) = foobar_registry();
    stub.on(
        Method::Get,
        "foo/bars",
        200,
        json!({ "bars": [
            { "id": 1, "title": "a" },
            { "id": 2, "title": "b" },
            { "id": 3, "title": "a" }
        ]}),
    );
    let bars = registry.repository::<Bar>().unwrap();

    let a = bars.filter(&[("title", json!("a"))]).unwrap();
    let ids: Vec<_> = a.iter().map(|bar| bar.id).collect();
    assert_eq!(ids, [Some(1), Some(3)]);

    let one_a = bars.filter(&[("title", json!("a")), ("id", json!(3))]).unwrap();
    assert_eq!(one_a.len(), 1);
    assert_eq!(one_a[0].id, Some(3));

    assert_eq!(stub.count(Method::Get), 1);
}

#[test]
fn paginated_reads_bypass_the_snapshot() {
    let (stub, registry) = foobar_registry();
    stub.on(
        Method::Get,
        "foo/bars",
        200,
        json!({
            "bars": [{ "id": 1, "title": "a" }],
            "meta": { "next_url": "foo/bars?page=2", "prev_url": null, "count": 2 }
        }),
    );
    stub.on(
        Method::Get,
        "foo/bars?page=2",
        200,
        json!({
            "bars": [{ "id": 2, "title": "b" }],
            "meta": { "next_url": null, "prev_url": "foo/bars", "count": 2 }
        }),
    );
    let bars = registry.repository::<Bar>().unwrap();

    let first = bars.all().unwrap();
    assert_eq!(first.next_page_query(), Some("page=2"));
    let next = first.next_url().unwrap().to_string();

    let page = bars.all_with(&Options::url(next)).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.prev_url(), Some("foo/bars"));
    assert_eq!(page.next_url(), None);
    assert_eq!(page.count_all(), Some(2));

    // The snapshot still holds the first page.
    let again = bars.all().unwrap();
    assert_eq!(again.len(), 1);
    assert_eq!(again.count_all(), Some(2));
    assert_eq!(stub.count(Method::Get), 2);
}
