//! Record - a model plus its sync state and validation errors.

use std::ops::{Deref, DerefMut};

use serde_json::Value;

use super::errors::{ErrorMessages, Errors};
use super::{from_attributes, to_attributes, Attributes, Model, ModelError};

/// A model instance as the client sees it.
///
/// Derefs to the model, so fields are read and written directly. Changes are
/// tracked by comparing the current attributes with the snapshot taken the
/// last time the record was loaded from or written to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<M> {
    model: M,
    synced: Attributes,
    errors: Errors,
}

impl<M: Model> Record<M> {
    /// Wrap a model that has not been sent to the server.
    pub fn new(model: M) -> Self {
        Self {
            model,
            synced: Attributes::new(),
            errors: Errors::new(),
        }
    }

    /// Materialize a record from attributes the server returned.
    pub fn from_remote(attributes: Attributes) -> Result<Self, ModelError> {
        let model = from_attributes::<M>(attributes)?;
        // Re-serialize so the snapshot matches exactly what the model holds.
        let synced = to_attributes(&model)?;
        Ok(Self {
            model,
            synced,
            errors: Errors::new(),
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// The server-assigned identifier.
    pub fn id(&self) -> Option<String> {
        self.model.id()
    }

    /// True once the record carries a non-empty id.
    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Current attributes, serialized from the model.
    pub fn attributes(&self) -> Result<Attributes, ModelError> {
        to_attributes(&self.model)
    }

    /// A single attribute value; `Null` when absent.
    pub fn attribute(&self, name: &str) -> Result<Value, ModelError> {
        Ok(self.attributes()?.remove(name).unwrap_or(Value::Null))
    }

    /// Names of attributes that differ from the last synced state.
    pub fn changed(&self) -> Result<Vec<String>, ModelError> {
        let current = self.attributes()?;
        let mut changed: Vec<String> = current
            .iter()
            .filter(|(name, value)| self.synced.get(name.as_str()).unwrap_or(&Value::Null) != *value)
            .map(|(name, _)| name.clone())
            .collect();
        changed.extend(
            self.synced
                .iter()
                .filter(|(name, value)| !current.contains_key(name.as_str()) && !value.is_null())
                .map(|(name, _)| name.clone()),
        );
        Ok(changed)
    }

    pub fn has_changes(&self) -> Result<bool, ModelError> {
        Ok(!self.changed()?.is_empty())
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    /// Overlay `attributes` onto the model without touching the synced state.
    pub fn assign(&mut self, attributes: &Attributes) -> Result<(), ModelError> {
        if attributes.is_empty() {
            return Ok(());
        }
        let mut merged = self.attributes()?;
        for (name, value) in attributes {
            merged.insert(name.clone(), value.clone());
        }
        self.model = from_attributes(merged)?;
        Ok(())
    }

    /// Take over every attribute the server returned, keeping this record (and
    /// any attribute the server left out) in place. The result becomes the new
    /// synced state and previous validation errors are dropped.
    pub fn merge_remote(&mut self, remote: Attributes) -> Result<(), ModelError> {
        let mut merged = self.attributes()?;
        for (name, value) in remote {
            merged.insert(name, value);
        }
        self.model = from_attributes(merged)?;
        self.synced = to_attributes(&self.model)?;
        self.errors.clear();
        Ok(())
    }

    /// Merge server validation messages into this record's errors.
    pub fn merge_errors(&mut self, messages: &ErrorMessages) -> Result<(), ModelError> {
        let attributes = self.attributes()?;
        self.errors
            .from_hash(messages, |name| attributes.contains_key(name));
        Ok(())
    }
}

impl<M> Deref for Record<M> {
    type Target = M;

    fn deref(&self) -> &M {
        &self.model
    }
}

impl<M> DerefMut for Record<M> {
    fn deref_mut(&mut self) -> &mut M {
        &mut self.model
    }
}

impl<M: Model> From<M> for Record<M> {
    fn from(model: M) -> Self {
        Record::new(model)
    }
}
