//! Adapters - translate repository operations into transport calls.
//!
//! An adapter knows one resource: where it lives, which status codes mean
//! success, and how to pull attribute sets out of a response body. It works on
//! untyped [`Attributes`]; repositories turn those into typed records.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use restmodel::{Adapter, Options, RestAdapter, Scope, StubTransport};
//!
//! let adapter = RestAdapter::new(Arc::new(StubTransport::new()), "Foo::Bar")
//!     .prefix("api")
//!     .format("json");
//!
//! assert_eq!(adapter.url_for(Scope::Member("7")), "api/foo/bars/7.json");
//! let bars = adapter.all(&Options::new())?;
//! ```

mod rest;

use crate::collection::Collection;
use crate::error::AdapterError;
use crate::model::Attributes;

/// Per-call options for reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Fetch this URL instead of the computed one (e.g. a pagination link).
    pub url: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that fetch `url` verbatim.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }

    /// True when nothing scopes the request, so cached results may answer it.
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
    }
}

/// What a resource URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// The collection.
    All,
    /// One member, or a path below it (`"7/publish"`).
    Member(&'a str),
}

/// Translation between repository operations and the transport.
///
/// Implementations hold no per-call state, so one instance may serve
/// concurrent callers.
pub trait Adapter: Send + Sync {
    /// Fetch one record. Expects 200.
    fn find(&self, id: &str, options: &Options) -> Result<Attributes, AdapterError>;

    /// Fetch the collection, with pagination metadata when present. Expects 200.
    fn all(&self, options: &Options) -> Result<Collection<Attributes>, AdapterError>;

    /// Create a record from `attributes`. Expects 201.
    fn create(&self, attributes: &Attributes) -> Result<Attributes, AdapterError>;

    /// Replace record `id` with `current` overlaid by `overrides`. Expects 200.
    fn update(
        &self,
        id: &str,
        current: &Attributes,
        overrides: &Attributes,
    ) -> Result<Attributes, AdapterError>;

    /// Trigger a member action (`POST <collection>/<id>/<action>`). Expects 201.
    fn post(&self, id: &str, action: &str) -> Result<Attributes, AdapterError>;
}

pub use rest::RestAdapter;
