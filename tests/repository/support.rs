//! Test domain: a flat `Foobar`, a namespaced `Foo::Bar`, and a bookshop `Book`.

use std::sync::Arc;

use restmodel::{Attributes, Method, Model, Registry, Repository, RestAdapter, StubTransport};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
pub struct Foobar {
    pub id: Option<u64>,
    pub name: String,
}

impl Foobar {
    pub fn named(name: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
#[model(name = "Foo::Bar")]
pub struct Bar {
    pub id: Option<u64>,
    pub title: String,
}

/// Uncountable: one record and many share the `news` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
pub struct News {
    pub id: Option<u64>,
    pub headline: String,
}

/// String ids, a custom id field, and unknown server fields kept aside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
#[model(name = "Shop::Book")]
pub struct Book {
    #[model(id)]
    #[serde(default)]
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<u64>,
    #[serde(default)]
    pub in_print: bool,
    #[serde(flatten)]
    pub extra: Attributes,
}

pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

/// A stub answering `GET foobars` with three records, and a registry using it.
pub fn foobar_registry() -> (StubTransport, Registry) {
    let stub = StubTransport::new();
    stub.on(
        Method::Get,
        "foobars",
        200,
        json!({ "foobars": [
            { "id": 1, "name": "one" },
            { "id": 2, "name": "two" },
            { "id": 3, "name": "three" }
        ]}),
    );

    let registry = Registry::builder()
        .default_connection(Arc::new(stub.clone()))
        .rest_adapter::<Foobar>()
        .rest_adapter::<Bar>()
        .rest_adapter::<News>()
        .adapter("Shop::Book", |connection| {
            Arc::new(RestAdapter::new(connection, "Shop::Book").prefix("api").format("json"))
        })
        .repository::<Book, _>(Repository::new)
        .build();

    (stub, registry)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

