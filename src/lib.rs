extern crate self as restmodel;

mod adapter;
mod collection;
mod config;
mod error;
pub mod inflect;
mod model;
mod registry;
mod repository;
mod transport;

pub use adapter::{Adapter, Options, RestAdapter, Scope};
pub use collection::{Collection, PageMeta};
pub use config::{Config, DEFAULT_URL_ENV};
pub use error::{AdapterError, RegistryError, RepositoryError, ResponseError};
pub use model::{
    from_attributes, to_attributes, Attributes, ErrorMessages, Errors, Model, ModelError, ModelId,
    Record, BASE,
};
pub use registry::{Adapters, Registry, RegistryBuilder, UnitOfWork};
pub use repository::{CacheScope, Outcome, Repository};
pub use transport::{Method, RecordedRequest, Response, StubTransport, Transport, TransportError};

#[cfg(feature = "http")]
pub use registry::identity_map;
#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Derive macro for `Model`
pub use restmodel_macros::Model;
