//! Repositories - per-model read/write façades with a one-slot cache.
//!
//! A repository resolves its adapter through the registry on every call, keeps
//! the last unscoped `all` result as a snapshot, and turns 422 responses into
//! record errors instead of failures.
//!
//! ## Example
//!
//! ```ignore
//! let categories = registry.repository::<Category>()?;
//!
//! let roots = categories.filter(&[("parent_id", Value::Null)])?;   // one GET
//! let tea = categories.find("7")?;                                   // served from the snapshot
//!
//! let mut record = Record::new(Category::named("Coffee"));
//! match categories.save(&mut record)? {
//!     Outcome::Rejected(_) => println!("{:?}", record.errors().full_messages()),
//!     _ => println!("saved as {:?}", record.id()),
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;

use crate::adapter::{Adapter, Options};
use crate::collection::Collection;
use crate::error::{AdapterError, RepositoryError, ResponseError};
use crate::inflect;
use crate::model::{Attributes, ErrorMessages, Model, Record};
use crate::registry::Adapters;

/// Result of a write that reached a decision.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the write; the record now mirrors its answer.
    Saved,
    /// Nothing changed since the last sync, so nothing was sent.
    Unchanged,
    /// The server rejected the write with validation messages, which were
    /// merged into the record's errors.
    Rejected(ErrorMessages),
}

impl Outcome {
    /// True unless the server rejected the write.
    pub fn is_saved(&self) -> bool {
        !self.is_rejected()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}

/// Anything holding cached state that must not outlive a unit of work.
pub trait CacheScope: Send + Sync {
    /// Resource key the cache belongs to.
    fn resource(&self) -> &str;

    /// Drop all cached state.
    fn clear_cache(&self);
}

/// Read/write façade for one model type.
pub struct Repository<M: Model> {
    adapters: Adapters,
    resource: String,
    snapshot: RwLock<Option<Collection<Record<M>>>>,
    /// Held while the snapshot is fetched, so cold readers queue behind one GET.
    fetching: Mutex<()>,
    /// Bumped on every clear; a fetch that started before a clear is not stored.
    generation: AtomicU64,
}

impl<M: Model> Repository<M> {
    /// Repository for `M`, using the adapter registered under `M`'s name.
    pub fn new(adapters: Adapters) -> Self {
        Self::with_resource(adapters, inflect::underscore(M::NAME))
    }

    /// Repository named after the conventional `"<Name>Repository"` type
    /// name; the adapter key is `<Name>` underscored.
    pub fn named(adapters: Adapters, type_name: &str) -> Self {
        Self::with_resource(adapters, inflect::repository_resource(type_name))
    }

    fn with_resource(adapters: Adapters, resource: String) -> Self {
        Self {
            adapters,
            resource,
            snapshot: RwLock::new(None),
            fetching: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Use the adapter registered under `name` instead.
    pub fn adapter_name(mut self, name: &str) -> Self {
        self.resource = inflect::underscore(name);
        self
    }

    /// Key the adapter is resolved by.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Resolve the adapter for this repository.
    pub fn adapter(&self) -> Result<Arc<dyn Adapter>, RepositoryError> {
        self.adapters
            .get(&self.resource)?
            .ok_or_else(|| RepositoryError::MissingAdapter(self.resource.clone()))
    }

    /// True while an `all` snapshot is held.
    pub fn is_cached(&self) -> bool {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// All records, from the snapshot when one is held.
    pub fn all(&self) -> Result<Collection<Record<M>>, RepositoryError> {
        self.all_with(&Options::new())
    }

    /// All records for `options`.
    ///
    /// Scoped requests always go to the adapter and leave the snapshot alone.
    /// Unscoped ones are answered from the snapshot, fetching and storing it
    /// first when absent. Concurrent cold reads share one fetch, and a fetch
    /// overtaken by [`Repository::clear_cache`] is returned but not stored.
    pub fn all_with(&self, options: &Options) -> Result<Collection<Record<M>>, RepositoryError> {
        if !options.is_empty() {
            return self.fetch_all(options);
        }

        if let Some(cached) = self.cached()? {
            return Ok(cached);
        }

        let _fetching = self
            .fetching
            .lock()
            .map_err(|_| RepositoryError::LockPoisoned("snapshot fetch"))?;
        // Someone else may have stored it while we waited.
        if let Some(cached) = self.cached()? {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let fetched = self.fetch_all(options)?;

        let mut snapshot = self
            .snapshot
            .write()
            .map_err(|_| RepositoryError::LockPoisoned("snapshot write"))?;
        if self.generation.load(Ordering::Acquire) == generation {
            tracing::debug!(resource = %self.resource, count = fetched.len(), "snapshot stored");
            *snapshot = Some(fetched.clone());
        } else {
            tracing::debug!(resource = %self.resource, "cache cleared during fetch, snapshot dropped");
        }
        Ok(fetched)
    }

    /// The record with `id`, from the snapshot when it holds one.
    pub fn find(&self, id: &str) -> Result<Record<M>, RepositoryError> {
        self.find_with(id, &Options::new())
    }

    /// The record with `id`; a custom URL in `options` bypasses the snapshot.
    pub fn find_with(&self, id: &str, options: &Options) -> Result<Record<M>, RepositoryError> {
        if options.is_empty() {
            if let Some(record) = self.find_locally(id)? {
                tracing::debug!(resource = %self.resource, id, "find served from snapshot");
                return Ok(record);
            }
        }

        let attributes = self.adapter()?.find(id, options)?;
        Ok(Record::from_remote(attributes)?)
    }

    /// Exact-id lookup in the snapshot. `None` when absent or not cached.
    pub fn find_locally(&self, id: &str) -> Result<Option<Record<M>>, RepositoryError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("snapshot read"))?;

        Ok(snapshot.as_ref().and_then(|cached| {
            cached
                .iter()
                .find(|record| record.id().as_deref() == Some(id))
                .cloned()
        }))
    }

    /// Records whose attributes equal every `(key, value)` pair, in order.
    ///
    /// Works on [`Repository::all`], so it shares the snapshot. An attribute
    /// the record does not have compares as `null`.
    pub fn filter(&self, query: &[(&str, Value)]) -> Result<Vec<Record<M>>, RepositoryError> {
        let mut matching = Vec::new();
        for record in self.all()? {
            let attributes = record.attributes()?;
            let matches = query
                .iter()
                .all(|(key, value)| attributes.get(*key).unwrap_or(&Value::Null) == value);
            if matches {
                matching.push(record);
            }
        }
        Ok(matching)
    }

    /// Create or update `record` on the server.
    ///
    /// New records are created and take over the server's attributes in
    /// place. Persisted records are updated only when they have changes.
    pub fn save(&self, record: &mut Record<M>) -> Result<Outcome, RepositoryError> {
        if record.is_persisted() {
            return self.update(record, None);
        }

        let attributes = record.attributes()?;
        let result = self.adapter()?.create(&attributes);
        self.reconcile(record, result)
    }

    /// Apply `params` to a persisted record and send it when it differs from
    /// the last synced state.
    pub fn update(
        &self,
        record: &mut Record<M>,
        params: Option<&Attributes>,
    ) -> Result<Outcome, RepositoryError> {
        let id = record.id().ok_or(RepositoryError::NotPersisted(M::NAME))?;
        if let Some(params) = params {
            record.assign(params)?;
        }

        if !record.has_changes()? {
            tracing::debug!(resource = %self.resource, id = %id, "update skipped, record unchanged");
            return Ok(Outcome::Unchanged);
        }

        let current = record.attributes()?;
        let empty = Attributes::new();
        let result = self
            .adapter()?
            .update(&id, &current, params.unwrap_or(&empty));
        self.reconcile(record, result)
    }

    /// Trigger a member action and return the record the server answers with.
    pub fn post(&self, id: &str, action: &str) -> Result<Record<M>, RepositoryError> {
        let attributes = self.adapter()?.post(id, action)?;
        Ok(Record::from_remote(attributes)?)
    }

    /// Drop the snapshot, including one still being fetched.
    pub fn clear_cache(&self) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::AcqRel);
        *snapshot = None;
    }

    fn cached(&self) -> Result<Option<Collection<Record<M>>>, RepositoryError> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("snapshot read"))?;
        if let Some(cached) = snapshot.as_ref() {
            tracing::debug!(resource = %self.resource, count = cached.len(), "all served from snapshot");
        }
        Ok(snapshot.clone())
    }

    fn fetch_all(&self, options: &Options) -> Result<Collection<Record<M>>, RepositoryError> {
        let collection = self.adapter()?.all(options)?;
        Ok(collection.try_map(Record::from_remote)?)
    }

    /// Fold a write result into the record. Only 422 is absorbed.
    fn reconcile(
        &self,
        record: &mut Record<M>,
        result: Result<Attributes, AdapterError>,
    ) -> Result<Outcome, RepositoryError> {
        match result {
            Ok(remote) => {
                record.merge_remote(remote)?;
                Ok(Outcome::Saved)
            }
            Err(AdapterError::Response(err @ ResponseError::UnprocessableEntity(_))) => {
                let messages = err.errors();
                record.merge_errors(&messages)?;
                tracing::warn!(
                    resource = %self.resource,
                    errors = record.errors().len(),
                    "write rejected by server validation"
                );
                Ok(Outcome::Rejected(messages))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl<M: Model> CacheScope for Repository<M> {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn clear_cache(&self) {
        Repository::clear_cache(self);
    }
}
