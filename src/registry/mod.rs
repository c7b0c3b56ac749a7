//! Registry - where repositories find their adapters.
//!
//! Adapters are registered as factories keyed by resource and built on first
//! use, then reused until [`Registry::reset`]. Adapters without a dedicated
//! connection share one default connection, itself built lazily. Repositories
//! obtained through [`Registry::repository`] are memoized and listed so a
//! reset can drop every cache at once.
//!
//! ## Example
//!
//! ```ignore
//! use restmodel::{Config, Registry, Repository};
//!
//! let registry = Registry::builder()
//!     .config(Config::from_env())
//!     .rest_adapter::<Category>()
//!     .adapter_with_connection("Shop::Order", orders_transport, |conn| {
//!         Arc::new(RestAdapter::new(conn, "Shop::Order").prefix("v2"))
//!     })
//!     .repository::<Category, _>(Repository::new)
//!     .build();
//!
//! {
//!     let _unit = registry.unit_of_work();
//!     let categories = registry.repository::<Category>()?;
//!     categories.all()?;
//! } // caches dropped here
//! ```

#[cfg(feature = "http")]
mod middleware;

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::adapter::{Adapter, RestAdapter};
use crate::config::Config;
use crate::error::RegistryError;
use crate::inflect;
use crate::model::Model;
use crate::repository::{CacheScope, Repository};
use crate::transport::{Transport, TransportError};

#[cfg(feature = "http")]
pub use middleware::identity_map;

type BuildAdapter = dyn Fn(Arc<dyn Transport>) -> Arc<dyn Adapter> + Send + Sync;
type Connect = dyn Fn(&Config) -> Result<Arc<dyn Transport>, TransportError> + Send + Sync;
type BuildRepository = dyn Fn(&Adapters) -> Box<dyn Any + Send + Sync> + Send + Sync;

/// A registered adapter factory.
struct AdapterRegistration {
    connection: Option<Arc<dyn Transport>>,
    build: Box<BuildAdapter>,
}

struct AdapterTable {
    config: Config,
    registrations: HashMap<String, AdapterRegistration>,
    connect: Box<Connect>,
    default_connection: Mutex<Option<Arc<dyn Transport>>>,
    memo: RwLock<HashMap<String, Arc<dyn Adapter>>>,
}

/// Shared handle to the adapter side of a registry.
///
/// Repositories hold one and resolve their adapter through it on every call,
/// so a reset is picked up without rebuilding them.
#[derive(Clone)]
pub struct Adapters {
    table: Arc<AdapterTable>,
}

impl Adapters {
    /// The adapter for `name` (a model name or its underscored key).
    ///
    /// `None` when nothing is registered under the name; the memo is left
    /// untouched in that case.
    pub fn get(&self, name: &str) -> Result<Option<Arc<dyn Adapter>>, RegistryError> {
        let key = inflect::underscore(name);

        {
            let memo = self
                .table
                .memo
                .read()
                .map_err(|_| RegistryError::LockPoisoned("adapter memo read"))?;
            if let Some(adapter) = memo.get(&key) {
                return Ok(Some(Arc::clone(adapter)));
            }
        }

        let Some(registration) = self.table.registrations.get(&key) else {
            return Ok(None);
        };

        let connection = match &registration.connection {
            Some(connection) => Arc::clone(connection),
            None => self.default_connection()?,
        };
        let built = (registration.build)(connection);

        let mut memo = self
            .table
            .memo
            .write()
            .map_err(|_| RegistryError::LockPoisoned("adapter memo write"))?;
        // A concurrent caller may have won the race; keep its instance.
        let adapter = memo.entry(key).or_insert_with(|| {
            tracing::debug!(resource = name, "adapter built");
            built
        });
        Ok(Some(Arc::clone(adapter)))
    }

    /// True when `name` has a registered factory.
    pub fn is_registered(&self, name: &str) -> bool {
        self.table
            .registrations
            .contains_key(&inflect::underscore(name))
    }

    /// Number of adapters built since the last reset.
    pub fn memoized(&self) -> usize {
        self.table
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn config(&self) -> &Config {
        &self.table.config
    }

    /// Forget every built adapter. The default connection survives.
    pub fn clear(&self) {
        self.table
            .memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn default_connection(&self) -> Result<Arc<dyn Transport>, RegistryError> {
        let mut slot = self
            .table
            .default_connection
            .lock()
            .map_err(|_| RegistryError::LockPoisoned("default connection"))?;

        if let Some(connection) = slot.as_ref() {
            return Ok(Arc::clone(connection));
        }

        let connection = (self.table.connect)(&self.table.config)?;
        tracing::info!(url = ?self.table.config.default_url, "default connection established");
        *slot = Some(Arc::clone(&connection));
        Ok(connection)
    }
}

struct RepositoryEntry {
    key: String,
    instance: Arc<dyn Any + Send + Sync>,
    cache: Arc<dyn CacheScope>,
}

struct RepositoryTable {
    factories: HashMap<String, Box<BuildRepository>>,
    entries: RwLock<Vec<RepositoryEntry>>,
}

/// Adapters and repositories for one client.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct Registry {
    adapters: Adapters,
    repositories: Arc<RepositoryTable>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn adapters(&self) -> &Adapters {
        &self.adapters
    }

    /// Shorthand for [`Adapters::get`].
    pub fn adapter(&self, name: &str) -> Result<Option<Arc<dyn Adapter>>, RegistryError> {
        self.adapters.get(name)
    }

    /// A new, unregistered repository for `M`.
    ///
    /// Built by the factory registered for `M`, or [`Repository::new`] when
    /// there is none. Its cache is not cleared by [`Registry::reset`].
    pub fn repository_for<M: Model>(&self) -> Result<Repository<M>, RegistryError> {
        let key = inflect::underscore(M::NAME);
        let Some(factory) = self.repositories.factories.get(&key) else {
            return Ok(Repository::new(self.adapters.clone()));
        };

        factory(&self.adapters)
            .downcast::<Repository<M>>()
            .map(|repository| *repository)
            .map_err(|_| RegistryError::TypeMismatch(M::NAME.to_string()))
    }

    /// The shared repository for `M`, built and registered on first use.
    pub fn repository<M: Model>(&self) -> Result<Arc<Repository<M>>, RegistryError> {
        let key = inflect::underscore(M::NAME);

        {
            let entries = self
                .repositories
                .entries
                .read()
                .map_err(|_| RegistryError::LockPoisoned("repository read"))?;
            if let Some(entry) = entries.iter().find(|entry| entry.key == key) {
                return Self::downcast(entry);
            }
        }

        let repository = Arc::new(self.repository_for::<M>()?);
        let mut entries = self
            .repositories
            .entries
            .write()
            .map_err(|_| RegistryError::LockPoisoned("repository write"))?;
        if let Some(entry) = entries.iter().find(|entry| entry.key == key) {
            return Self::downcast(entry);
        }

        tracing::debug!(resource = %key, "repository registered");
        entries.push(RepositoryEntry {
            key,
            instance: repository.clone(),
            cache: repository.clone(),
        });
        Ok(repository)
    }

    /// Keys of the registered repositories, in registration order.
    pub fn repositories(&self) -> Vec<String> {
        self.repositories
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Drop every registered repository's cache and every built adapter.
    ///
    /// Repositories stay registered; their next read goes to the server.
    pub fn reset(&self) {
        let entries = self
            .repositories
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter() {
            entry.cache.clear_cache();
        }
        self.adapters.clear();
        tracing::info!(repositories = entries.len(), "registry reset");
    }

    /// Scope caches to the returned guard: the registry resets when it drops.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork {
            registry: self.clone(),
        }
    }

    fn downcast<M: Model>(entry: &RepositoryEntry) -> Result<Arc<Repository<M>>, RegistryError> {
        Arc::clone(&entry.instance)
            .downcast::<Repository<M>>()
            .map_err(|_| RegistryError::TypeMismatch(M::NAME.to_string()))
    }
}

/// Resets its registry when dropped.
#[must_use = "the registry resets as soon as the unit of work is dropped"]
pub struct UnitOfWork {
    registry: Registry,
}

impl UnitOfWork {
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        self.registry.reset();
    }
}

/// Builder for [`Registry`].
pub struct RegistryBuilder {
    config: Config,
    registrations: HashMap<String, AdapterRegistration>,
    repositories: HashMap<String, Box<BuildRepository>>,
    connect: Option<Box<Connect>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            registrations: HashMap::new(),
            repositories: HashMap::new(),
            connect: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Register an adapter factory for `name` using the default connection.
    pub fn adapter<F>(mut self, name: &str, build: F) -> Self
    where
        F: Fn(Arc<dyn Transport>) -> Arc<dyn Adapter> + Send + Sync + 'static,
    {
        self.registrations.insert(
            inflect::underscore(name),
            AdapterRegistration {
                connection: None,
                build: Box::new(build),
            },
        );
        self
    }

    /// Register an adapter factory for `name` with its own connection.
    pub fn adapter_with_connection<F>(
        mut self,
        name: &str,
        connection: Arc<dyn Transport>,
        build: F,
    ) -> Self
    where
        F: Fn(Arc<dyn Transport>) -> Arc<dyn Adapter> + Send + Sync + 'static,
    {
        self.registrations.insert(
            inflect::underscore(name),
            AdapterRegistration {
                connection: Some(connection),
                build: Box::new(build),
            },
        );
        self
    }

    /// Register a plain [`RestAdapter`] for `M` on the default connection.
    pub fn rest_adapter<M: Model>(self) -> Self {
        self.adapter(M::NAME, |connection| {
            Arc::new(RestAdapter::for_model::<M>(connection))
        })
    }

    /// Register how the repository for `M` is built.
    pub fn repository<M, F>(mut self, build: F) -> Self
    where
        M: Model,
        F: Fn(Adapters) -> Repository<M> + Send + Sync + 'static,
    {
        self.repositories.insert(
            inflect::underscore(M::NAME),
            Box::new(move |adapters: &Adapters| {
                Box::new(build(adapters.clone())) as Box<dyn Any + Send + Sync>
            }),
        );
        self
    }

    /// Use `connection` as the default connection.
    pub fn default_connection(mut self, connection: Arc<dyn Transport>) -> Self {
        self.connect = Some(Box::new(move |_: &Config| Ok(Arc::clone(&connection))));
        self
    }

    /// Build the default connection with `connect` on first use.
    pub fn connect_with<F>(mut self, connect: F) -> Self
    where
        F: Fn(&Config) -> Result<Arc<dyn Transport>, TransportError> + Send + Sync + 'static,
    {
        self.connect = Some(Box::new(connect));
        self
    }

    pub fn build(self) -> Registry {
        let connect = self.connect.unwrap_or_else(|| Box::new(connect_default));
        Registry {
            adapters: Adapters {
                table: Arc::new(AdapterTable {
                    config: self.config,
                    registrations: self.registrations,
                    connect,
                    default_connection: Mutex::new(None),
                    memo: RwLock::new(HashMap::new()),
                }),
            },
            repositories: Arc::new(RepositoryTable {
                factories: self.repositories,
                entries: RwLock::new(Vec::new()),
            }),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
fn connect_default(config: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    let url = config
        .default_url
        .as_deref()
        .ok_or_else(|| TransportError::Config("no default URL configured".into()))?;
    Ok(Arc::new(crate::transport::HttpTransport::new(url)?))
}

#[cfg(not(feature = "http"))]
fn connect_default(_: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    Err(TransportError::Config(
        "no default connection; enable the `http` feature or set one on the builder".into(),
    ))
}
